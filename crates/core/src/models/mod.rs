//! Shared domain models.

use serde::{Deserialize, Serialize};

/// A single backlog entry, named as the upstream API stores it.
///
/// Field names are PascalCase on the wire. Optional fields are omitted from
/// serialized output when unset, so a minimal record round-trips without
/// spurious nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    /// Steam application id. Primary identifier, immutable once created.
    pub steam_app_id: u32,
    /// Game title.
    pub title: String,
    /// Genre label, free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Studio or developer credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    /// Year of release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Whether the game has been finished.
    pub completed: bool,
    /// Date the game was finished (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<String>,
    /// Whether the game was abandoned.
    pub dropped: bool,
    /// Hours played so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playtime_hours: Option<f64>,
    /// Personal rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Free-form review text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// Date the record was last validated server-side. Owned by the server
    /// and never echoed back in update requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_on: Option<String>,
}

impl Game {
    /// Minimal record for a newly tracked game.
    pub fn new(steam_app_id: u32, title: impl Into<String>) -> Self {
        Self {
            steam_app_id,
            title: title.into(),
            genre: None,
            developer: None,
            release_year: None,
            completed: false,
            completed_on: None,
            dropped: false,
            playtime_hours: None,
            rating: None,
            review: None,
            validated_on: None,
        }
    }

    /// Copy of this record with the validation stamp cleared, suitable as an
    /// update payload. The server manages `ValidatedOn` itself.
    pub fn without_validation_stamp(&self) -> Game {
        Game {
            validated_on: None,
            ..self.clone()
        }
    }

    /// Returns a user-facing label combining title and release year.
    pub fn display_name(&self) -> String {
        match self.release_year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::{json, Value};

    fn sample_game() -> Game {
        Game {
            genre: Some("Roguelike".to_string()),
            developer: Some("Supergiant".to_string()),
            release_year: Some(2020),
            completed: true,
            completed_on: Some("2024-03-01".to_string()),
            rating: Some(9.5),
            validated_on: Some("2024-04-01".to_string()),
            ..Game::new(1_145_360, "Hades")
        }
    }

    #[test]
    fn wire_names_are_pascal_case() -> Result<()> {
        let value = serde_json::to_value(sample_game())?;
        let object = value.as_object().expect("record serializes to an object");
        for key in [
            "SteamAppId",
            "Title",
            "Genre",
            "Developer",
            "ReleaseYear",
            "Completed",
            "CompletedOn",
            "Dropped",
            "Rating",
            "ValidatedOn",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        Ok(())
    }

    #[test]
    fn unset_optionals_are_omitted() -> Result<()> {
        let value = serde_json::to_value(Game::new(620, "Portal 2"))?;
        let object = value.as_object().expect("record serializes to an object");
        assert!(!object.contains_key("Genre"));
        assert!(!object.contains_key("CompletedOn"));
        assert!(!object.contains_key("Review"));
        assert_eq!(object.get("Completed"), Some(&Value::Bool(false)));
        assert_eq!(object.get("Dropped"), Some(&Value::Bool(false)));
        Ok(())
    }

    #[test]
    fn update_payload_never_carries_validation_stamp() -> Result<()> {
        let stamped = sample_game();
        let value = serde_json::to_value(stamped.without_validation_stamp())?;
        assert!(value.get("ValidatedOn").is_none());

        let unstamped = Game::new(620, "Portal 2");
        let value = serde_json::to_value(unstamped.without_validation_stamp())?;
        assert!(value.get("ValidatedOn").is_none());
        Ok(())
    }

    #[test]
    fn deserializes_with_missing_optionals() -> Result<()> {
        let game: Game = serde_json::from_value(json!({
            "SteamAppId": 620,
            "Title": "Portal 2",
            "Completed": false,
            "Dropped": false
        }))?;
        assert_eq!(game.steam_app_id, 620);
        assert_eq!(game.title, "Portal 2");
        assert!(game.genre.is_none());
        assert!(game.completed_on.is_none());
        Ok(())
    }

    #[test]
    fn rejects_records_missing_required_fields() {
        let result: serde_json::Result<Game> = serde_json::from_value(json!({
            "Title": "No id here",
            "Completed": false,
            "Dropped": false
        }));
        assert!(result.is_err());
    }

    #[test]
    fn display_name_includes_release_year() {
        assert_eq!(sample_game().display_name(), "Hades (2020)");
        assert_eq!(Game::new(620, "Portal 2").display_name(), "Portal 2");
    }
}
