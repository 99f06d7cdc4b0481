use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.3;
const MIN_TEXT_LENGTH: usize = 40;

/// Detected language of a post, as an ISO 639-1 code where one exists.
/// Short or ambiguous text yields `None`; posts are noisy and a wrong
/// language signal is worse than no signal.
pub fn detect_language(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_TEXT_LENGTH {
        return None;
    }

    let info = detect(trimmed)?;
    if info.confidence() < MIN_CONFIDENCE {
        return None;
    }
    Some(iso_code(info.lang()))
}

fn iso_code(lang: Lang) -> String {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Tur => "tr",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        _ => return format!("{:?}", lang).to_lowercase(),
    };
    code.to_string()
}
