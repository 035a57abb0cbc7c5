// Spoken-language detection for the voice onboarding flow
use serde::Serialize;

pub const ENGLISH: &str = "en";
pub const BENGALI: &str = "bn";
pub const HINDI: &str = "hi";
pub const KANNADA: &str = "kn";
pub const TAMIL: &str = "ta";
pub const TELUGU: &str = "te";

struct ScriptRange {
    code: &'static str,
    start: u32,
    end: u32,
}

const SCRIPTS: [ScriptRange; 5] = [
    ScriptRange { code: HINDI, start: 0x0900, end: 0x097F },
    ScriptRange { code: BENGALI, start: 0x0980, end: 0x09FF },
    ScriptRange { code: TAMIL, start: 0x0B80, end: 0x0BFF },
    ScriptRange { code: KANNADA, start: 0x0C80, end: 0x0CFF },
    ScriptRange { code: TELUGU, start: 0x0C00, end: 0x0C7F },
];

// Romanized language names, full words before their prefixes.
const KEYWORDS: [(&str, &str); 12] = [
    ("english", ENGLISH),
    ("hindi", HINDI),
    ("bengali", BENGALI),
    ("bangla", BENGALI),
    ("kannada", KANNADA),
    ("tamil", TAMIL),
    ("telugu", TELUGU),
    ("hind", HINDI),
    ("bangal", BENGALI),
    ("kanna", KANNADA),
    ("tam", TAMIL),
    ("tel", TELUGU),
];

/// Detects the language a transcript is in, or names.
///
/// Native script wins over keywords; plain ASCII text with no language name
/// is treated as English. Anything else is undetermined.
pub fn detect_language(transcript: &str) -> Option<&'static str> {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    for ch in text.chars() {
        let code_point = ch as u32;
        if let Some(script) = SCRIPTS
            .iter()
            .find(|s| (s.start..=s.end).contains(&code_point))
        {
            return Some(script.code);
        }
    }

    if let Some((_, code)) = KEYWORDS.iter().find(|(keyword, _)| text.contains(keyword)) {
        return Some(code);
    }

    let plain = text
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || ".,?!".contains(c));
    plain.then_some(ENGLISH)
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguagePrompt {
    pub code: &'static str,
    pub text: &'static str,
    pub lang: &'static str,
}

/// "Please choose by speaking in your preferred language", in every supported
/// language.
pub const PROMPTS: [LanguagePrompt; 6] = [
    LanguagePrompt {
        code: ENGLISH,
        text: "Please choose by speaking in your preferred language.",
        lang: ENGLISH,
    },
    LanguagePrompt {
        code: BENGALI,
        text: "অনুগ্রহ করে আপনার পছন্দের ভাষায় কথা বলে বেছে নিন।",
        lang: BENGALI,
    },
    LanguagePrompt {
        code: HINDI,
        text: "कृपया अपनी पसंदीदा भाषा में बोलकर चुनें।",
        lang: HINDI,
    },
    LanguagePrompt {
        code: KANNADA,
        text: "ದಯವಿಟ್ಟು ನಿಮ್ಮ ಆದ್ಯತೆಯ ಭಾಷೆಯಲ್ಲಿ ಮಾತನಾಡುವ ಮೂಲಕ ಆಯ್ಕೆಮಾಡಿ.",
        lang: KANNADA,
    },
    LanguagePrompt {
        code: TAMIL,
        text: "தயவுசெய்து உங்கள் விருப்பமான மொழியில் பேசித் தேர்ந்தெடுக்கவும்.",
        lang: TAMIL,
    },
    LanguagePrompt {
        code: TELUGU,
        text: "దయచేసి మీకు ఇష్టమైన భాషలో మాట్లాడి ఎంచుకోండి.",
        lang: TELUGU,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_detection() {
        assert_eq!(detect_language("नमस्ते"), Some(HINDI));
        assert_eq!(detect_language("আমি বাংলা"), Some(BENGALI));
        assert_eq!(detect_language("வணக்கம்"), Some(TAMIL));
        assert_eq!(detect_language("ನಮಸ್ಕಾರ"), Some(KANNADA));
        assert_eq!(detect_language("నమస్కారం"), Some(TELUGU));
    }

    #[test]
    fn test_keyword_detection() {
        assert_eq!(detect_language("I want Bangla please"), Some(BENGALI));
        assert_eq!(detect_language("Kannada"), Some(KANNADA));
    }

    #[test]
    fn test_plain_text_defaults_to_english() {
        assert_eq!(detect_language("Hello, how are you?"), Some(ENGLISH));
        assert_eq!(detect_language("   "), None);
        assert_eq!(detect_language("¿qué?"), None);
    }
}
