use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

pub const FIELD_WORD: &str = "Word";
pub const FIELD_SOUND: &str = "Sound";
pub const FIELD_MEANING: &str = "Meaning";
pub const FIELD_IPA: &str = "IPA";

/// Field order of the card model.
pub const MODEL_FIELDS: [&str; 4] = [FIELD_WORD, FIELD_SOUND, FIELD_MEANING, FIELD_IPA];

/// Media AnkiConnect downloads and appends to `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttachment {
    pub url: String,
    pub filename: String,
    pub fields: Vec<String>,
}

/// Rendered content for one word; this is also the value stored in the note cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub audio: Option<AudioAttachment>,
}

impl Note {
    pub fn word(&self) -> Option<&str> {
        self.fields.get(FIELD_WORD).map(String::as_str)
    }

    pub fn meaning(&self) -> Option<&str> {
        self.fields.get(FIELD_MEANING).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

/// One entry of the `addNotes` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteParams {
    pub deck_name: String,
    pub model_name: String,
    pub options: NoteOptions,
    pub fields: BTreeMap<String, String>,
    pub audio: Option<Vec<AudioAttachment>>,
}

impl NoteParams {
    pub fn new(note: &Note, deck_name: &str, model_name: &str, allow_duplicate: bool) -> Self {
        Self {
            deck_name: deck_name.to_string(),
            model_name: model_name.to_string(),
            options: NoteOptions { allow_duplicate },
            fields: note.fields.clone(),
            audio: note.audio.clone().map(|a| vec![a]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CardTemplate {
    pub name: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelParams {
    pub model_name: String,
    pub in_order_fields: Vec<String>,
    pub is_cloze: bool,
    pub css: String,
    pub card_templates: Vec<CardTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_params_wire_shape() {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_WORD.to_string(), "apple".to_string());
        let note = Note {
            fields,
            audio: Some(AudioAttachment {
                url: "https://example.org/apple-us.mp3".to_string(),
                filename: "apple-us.mp3".to_string(),
                fields: vec![FIELD_SOUND.to_string()],
            }),
        };

        let value = serde_json::to_value(NoteParams::new(&note, "Deck", "Model", false)).unwrap();
        assert_eq!(value["deckName"], "Deck");
        assert_eq!(value["modelName"], "Model");
        assert_eq!(value["options"]["allowDuplicate"], false);
        assert_eq!(value["fields"]["Word"], "apple");
        assert_eq!(value["audio"][0]["filename"], "apple-us.mp3");
        assert_eq!(value["audio"][0]["fields"][0], "Sound");
    }

    #[test]
    fn note_without_audio_serializes_null() {
        let note = Note { fields: BTreeMap::new(), audio: None };
        let value = serde_json::to_value(NoteParams::new(&note, "D", "M", true)).unwrap();
        assert!(value["audio"].is_null());
    }

    #[test]
    fn create_model_wire_shape() {
        let params = CreateModelParams {
            model_name: "M".to_string(),
            in_order_fields: MODEL_FIELDS.iter().map(|s| s.to_string()).collect(),
            is_cloze: false,
            css: ".card {}".to_string(),
            card_templates: vec![CardTemplate {
                name: "M".to_string(),
                front: "{{Word}}".to_string(),
                back: "{{Meaning}}".to_string(),
            }],
        };
        let value = serde_json::to_value(params).unwrap();
        assert_eq!(value["inOrderFields"][2], "Meaning");
        assert_eq!(value["isCloze"], false);
        assert_eq!(value["cardTemplates"][0]["Front"], "{{Word}}");
    }
}
