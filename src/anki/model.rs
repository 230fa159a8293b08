use std::{
    fs,
    path::Path,
};

use super::types::{
    CardTemplate,
    CreateModelParams,
    MODEL_FIELDS,
};
use crate::core::{
    config::DictionaryLinks,
    Config,
    LazyError,
};

const DEFAULT_FRONT: &str = r#"<div class="word">{{Word}}</div>
<div class="ipa">{{IPA}}</div>
{{Sound}}"#;

const DEFAULT_BACK: &str = r#"{{FrontSide}}
<hr id="answer">
<div class="meaning">{{Meaning}}</div>
"#;

const DEFAULT_CSS: &str = r#".card {
  font-family: arial;
  font-size: 20px;
  text-align: center;
  color: black;
  background-color: white;
}
.word { font-size: 32px; font-weight: bold; }
.ipa { color: #666; }
.meaning { text-align: left; }
.meaning img, p img { height: 32px; }
"#;

const CAMBRIDGE_LOGO: &str = "https://w7.pngwing.com/pngs/647/218/png-transparent-coat-of-arms-of-the-university-of-cambridge-university-of-oxford-ulverston-victoria-high-school-others-text-logo-symmetry.png";

struct DictionaryLink {
    prefix: &'static str,
    url: &'static str,
    logo: &'static str,
}

const OXFORD: DictionaryLink = DictionaryLink {
    prefix: "",
    url: "https://www.oxfordlearnersdictionaries.com/definition/english/{{Word}}",
    logo: "https://fontslogo.com/wp-content/uploads/2017/10/Oxford-Dictionaries-Logo-Font.jpg",
};

const CAMBRIDGE: DictionaryLink = DictionaryLink {
    prefix: "",
    url: "https://dictionary.cambridge.org/dictionary/english/{{Word}}/",
    logo: CAMBRIDGE_LOGO,
};

const MACMILLAN: DictionaryLink = DictionaryLink {
    prefix: "",
    url: "https://www.macmillandictionary.com/dictionary/british/{{Word}}",
    logo: "https://pbs.twimg.com/profile_images/1225002102608494592/GRFg82nJ_400x400.jpg",
};

const URBAN_DICTIONARY: DictionaryLink = DictionaryLink {
    prefix: "",
    url: "https://www.urbandictionary.com/define.php?term={{Word}}",
    logo: "https://play-lh.googleusercontent.com/unQjigibyJQvru9rcCOX7UCqyByuf5-h_tLpA-9fYH93uqrRAnZ0J2IummiejMMhi5Ch",
};

const CAMBRIDGE_RU: DictionaryLink = DictionaryLink {
    prefix: "ru:",
    url: "https://dictionary.cambridge.org/dictionary/english-russian/{{Word}}/",
    logo: CAMBRIDGE_LOGO,
};

fn enabled_links(links: &DictionaryLinks) -> Vec<&'static DictionaryLink> {
    [
        (links.oxford, &OXFORD),
        (links.cambridge, &CAMBRIDGE),
        (links.macmillan, &MACMILLAN),
        (links.urban_dictionary, &URBAN_DICTIONARY),
        (links.cambridge_ru, &CAMBRIDGE_RU),
    ]
    .into_iter()
    .filter_map(|(enabled, link)| enabled.then_some(link))
    .collect()
}

/// Appends a `<p>` block with one link per enabled dictionary.
pub fn append_dictionary_links(back_html: &str, links: &DictionaryLinks) -> String {
    let mut back = String::from(back_html);
    back.push_str("<p>");
    for link in enabled_links(links) {
        back.push_str(&format!(
            "{}<a href=\"{}\"><img src=\"{}\"></a>\n",
            link.prefix, link.url, link.logo
        ));
    }
    back.push_str("</p>");
    back
}

struct TemplateSources {
    front: String,
    back: String,
    css: String,
}

fn load_sources(templates_dir: Option<&Path>) -> Result<TemplateSources, LazyError> {
    let Some(dir) = templates_dir else {
        return Ok(TemplateSources {
            front: DEFAULT_FRONT.to_string(),
            back: DEFAULT_BACK.to_string(),
            css: DEFAULT_CSS.to_string(),
        });
    };

    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).map_err(|e| {
            LazyError::ConfigIo(format!("Failed to read template {}: {}", path.display(), e))
        })
    };

    Ok(TemplateSources { front: read("front.html")?, back: read("back.html")?, css: read("styling.css")? })
}

/// Parameters for `createModel` under the active configuration.
pub fn build_model(config: &Config) -> Result<CreateModelParams, LazyError> {
    let sources = load_sources(config.templates_dir.as_deref())?;

    Ok(CreateModelParams {
        model_name: config.model_name.clone(),
        in_order_fields: MODEL_FIELDS.iter().map(|f| f.to_string()).collect(),
        is_cloze: false,
        css: sources.css,
        card_templates: vec![CardTemplate {
            name: config.model_name.clone(),
            front: sources.front,
            back: append_dictionary_links(&sources.back, &config.dictionaries),
        }],
    })
}
