use std::collections::BTreeMap;

use html_escape::encode_text;

use super::{
    Definition,
    Entry,
    Meaning,
    Phonetic,
};
use crate::{
    anki::types::{
        AudioAttachment,
        Note,
        FIELD_IPA,
        FIELD_MEANING,
        FIELD_SOUND,
        FIELD_WORD,
    },
    core::LazyError,
};

pub const GROUP_SEPARATOR: &str = "<hr />";

fn join_escaped(words: &[String]) -> String {
    words.iter().map(|w| encode_text(w).into_owned()).collect::<Vec<_>>().join(", ")
}

fn render_definition(index: usize, definition: &Definition) -> String {
    let mut block = format!("<div>{}) {}<br /> ", index, encode_text(&definition.definition));

    if let Some(example) = definition.example.as_deref().filter(|e| !e.is_empty()) {
        block.push_str(&format!("&nbsp;→ {}<br />", encode_text(example)));
    }
    if !definition.synonyms.is_empty() {
        block.push_str(&format!("&nbsp; synonyms: {}<br/>", join_escaped(&definition.synonyms)));
    }
    if !definition.antonyms.is_empty() {
        block.push_str(&format!("&nbsp; antonyms: {}<br/>", join_escaped(&definition.antonyms)));
    }

    block.push_str("</div>");
    block
}

fn render_group(meaning: &Meaning) -> String {
    let mut group = format!("{}:", encode_text(&meaning.part_of_speech));

    for (i, definition) in meaning.definitions.iter().enumerate() {
        group.push_str(&render_definition(i + 1, definition));
    }
    if !meaning.synonyms.is_empty() {
        group.push_str(&format!("synonyms: {}<br />", join_escaped(&meaning.synonyms)));
    }

    group.push_str(GROUP_SEPARATOR);
    group
}

/// Renders every part-of-speech group of the entry, each closed by a horizontal rule.
/// Groups are joined by a single space, so the result carries no trailing whitespace.
pub fn render_meaning(entry: &Entry) -> String {
    entry.meanings.iter().map(render_group).collect::<Vec<_>>().join(" ")
}

/// The first phonetic that carries audio, in source order.
pub fn select_audio(phonetics: &[Phonetic]) -> Option<AudioAttachment> {
    let url = phonetics
        .iter()
        .filter_map(|p| p.audio.as_deref())
        .map(str::trim)
        .find(|audio| !audio.is_empty())?;

    Some(AudioAttachment {
        url: url.to_string(),
        filename: audio_filename(url),
        fields: vec![FIELD_SOUND.to_string()],
    })
}

fn audio_filename(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => path.replace(['/', ':'], "_"),
    }
}

/// Builds the note for `word` from its dictionary entry.
pub fn render_note(word: &str, entry: &Entry) -> Result<Note, LazyError> {
    let meaning = render_meaning(entry);
    if meaning.is_empty() {
        return Err(LazyError::LookupNotFound(word.to_string()));
    }

    let canonical = if entry.word.trim().is_empty() { word } else { entry.word.as_str() };
    let ipa = entry
        .phonetic
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| entry.phonetics.iter().filter_map(|p| p.text.clone()).find(|t| !t.is_empty()))
        .unwrap_or_default();

    let mut fields = BTreeMap::new();
    fields.insert(FIELD_WORD.to_string(), encode_text(canonical).into_owned());
    fields.insert(FIELD_IPA.to_string(), encode_text(&ipa).into_owned());
    fields.insert(FIELD_MEANING.to_string(), meaning);
    fields.insert(FIELD_SOUND.to_string(), String::new());

    Ok(Note { fields, audio: select_audio(&entry.phonetics) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(text: &str) -> Definition {
        Definition { definition: text.to_string(), ..Definition::default() }
    }

    fn sample_entry() -> Entry {
        Entry {
            word: "light".to_string(),
            phonetic: Some("/laɪt/".to_string()),
            phonetics: vec![],
            meanings: vec![Meaning {
                part_of_speech: "adjective".to_string(),
                definitions: vec![
                    Definition {
                        example: Some("a light room".to_string()),
                        ..definition("Having plenty of light.")
                    },
                    Definition {
                        synonyms: vec!["weightless".to_string(), "airy".to_string()],
                        antonyms: vec!["heavy".to_string()],
                        ..definition("Of low weight.")
                    },
                ],
                synonyms: vec![],
                antonyms: vec![],
            }],
        }
    }

    #[test]
    fn renders_numbered_blocks_for_one_group() {
        let meaning = render_meaning(&sample_entry());

        assert_eq!(
            meaning,
            "adjective:<div>1) Having plenty of light.<br /> &nbsp;→ a light room<br /></div>\
             <div>2) Of low weight.<br /> &nbsp; synonyms: weightless, airy<br/>\
             &nbsp; antonyms: heavy<br/></div><hr />"
        );
        assert_eq!(meaning.matches("<div>").count(), 2);
        assert_eq!(meaning.matches(GROUP_SEPARATOR).count(), 1);
        assert!(meaning.contains("&nbsp;→ a light room"));
        assert!(!meaning.contains("→ weightless"));
        assert!(!meaning.starts_with(' ') && !meaning.ends_with(' '));
    }

    #[test]
    fn groups_are_separated_and_carry_group_synonyms() {
        let mut entry = sample_entry();
        entry.meanings.push(Meaning {
            part_of_speech: "verb".to_string(),
            definitions: vec![definition("To ignite.")],
            synonyms: vec!["kindle".to_string()],
            antonyms: vec![],
        });

        let meaning = render_meaning(&entry);
        assert_eq!(meaning.matches(GROUP_SEPARATOR).count(), 2);
        assert!(meaning.contains("</div><hr /> verb:<div>1) To ignite.<br /> </div>synonyms: kindle<br /><hr />"));
        assert!(meaning.ends_with(GROUP_SEPARATOR));
    }

    #[test]
    fn escapes_markup_in_source_text() {
        let mut entry = sample_entry();
        entry.meanings[0].definitions = vec![definition("less < more & <b>bold</b>")];
        let meaning = render_meaning(&entry);
        assert!(meaning.contains("1) less &lt; more &amp; &lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn picks_first_phonetic_with_audio() {
        let phonetics = vec![
            Phonetic { text: Some("/a/".to_string()), audio: Some(String::new()) },
            Phonetic { text: None, audio: None },
            Phonetic {
                text: None,
                audio: Some("https://api.dictionaryapi.dev/media/pronunciations/en/light-us.mp3".to_string()),
            },
            Phonetic { text: None, audio: Some("https://x/other.mp3".to_string()) },
        ];
        let audio = select_audio(&phonetics).unwrap();
        assert!(audio.url.ends_with("light-us.mp3"));
        assert_eq!(audio.filename, "light-us.mp3");
        assert_eq!(audio.fields, vec!["Sound"]);
    }

    #[test]
    fn no_audio_means_no_attachment() {
        let phonetics = vec![Phonetic { text: Some("/a/".to_string()), audio: Some("  ".to_string()) }];
        assert!(select_audio(&phonetics).is_none());
        assert!(select_audio(&[]).is_none());
    }

    #[test]
    fn note_fields_hold_word_and_meaning() {
        let note = render_note("light", &sample_entry()).unwrap();
        assert_eq!(note.word(), Some("light"));
        assert_eq!(note.fields[FIELD_IPA], "/laɪt/");
        assert!(note.meaning().unwrap().starts_with("adjective:"));
        assert!(note.audio.is_none());
    }

    #[test]
    fn word_and_ipa_are_escaped_like_the_meaning() {
        let mut entry = sample_entry();
        entry.word = "rock & roll".to_string();
        entry.phonetic = Some("<ˈrɒk>".to_string());
        let note = render_note("rock", &entry).unwrap();
        assert_eq!(note.word(), Some("rock &amp; roll"));
        assert_eq!(note.fields[FIELD_IPA], "&lt;ˈrɒk&gt;");
    }

    #[test]
    fn entry_without_meanings_is_not_found() {
        let entry = Entry { word: "hmm".to_string(), ..Entry::default() };
        assert!(matches!(render_note("hmm", &entry), Err(LazyError::LookupNotFound(w)) if w == "hmm"));
    }
}
