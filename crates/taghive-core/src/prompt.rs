use taghive_schema::{Intent, Sentiment};

use crate::taxonomy::Taxonomy;

const PREAMBLE: &str = "คุณคือผู้ช่วยด้านการวิเคราะห์ความคิดเห็นของลูกค้าสำหรับโครงการ Social Listening ที่เกี่ยวข้องกับบริการรถไฟฟ้า BTS ในประเทศไทย งานของคุณคือการจัดประเภทข้อความตามเงื่อนไขต่อไปนี้";

/// Build the classification instruction for one message.
///
/// Pure and deterministic: the same taxonomy and text always produce the
/// same bytes. The message is placed inside double quotes on its own line,
/// with backslashes and embedded quotes escaped so the span stays
/// unambiguous.
pub fn build_prompt(taxonomy: &Taxonomy, text: &str) -> String {
    let intents = Intent::ALL
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let sentiments = Sentiment::PROMPT_ORDER
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{PREAMBLE}\n\n\
         [1] หมวดหมู่ (categories):\n{categories}\n\n\
         [2] เจตนา (intent):\n{intents}\n\n\
         [3] อารมณ์ (sentiment):\n{sentiments}\n\n\
         ข้อความที่จะให้วิเคราะห์:\n\"{post}\"\n",
        categories = taxonomy.render_bullets(),
        post = quote_escape(text),
    )
}

fn quote_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyPreset;
    use taghive_schema::CategoryEntry;

    #[test]
    fn every_label_and_description_appears_exactly_once() {
        let taxonomy = TaxonomyPreset::Detailed.taxonomy();
        let prompt = build_prompt(&taxonomy, "รถไฟฟ้าเสียบ่อยมาก");
        for entry in taxonomy.iter() {
            assert_eq!(prompt.matches(entry.label.as_str()).count(), 1, "{}", entry.label);
            assert_eq!(
                prompt.matches(entry.description.as_str()).count(),
                1,
                "{}",
                entry.description
            );
            let bullet = format!("- {}: {}", entry.label, entry.description);
            assert!(prompt.contains(&bullet));
        }
    }

    #[test]
    fn prompt_lists_six_intents_and_three_sentiments() {
        let prompt = build_prompt(&TaxonomyPreset::Detailed.taxonomy(), "x");
        for intent in Intent::ALL {
            assert!(prompt.contains(&format!("- {intent}\n")));
        }
        assert!(prompt.contains("- Positive\n- Neutral\n- Negative"));
        assert!(!prompt.contains("เปรียบเทียบ\n"));
    }

    #[test]
    fn input_text_is_quoted_at_the_end() {
        let prompt = build_prompt(&TaxonomyPreset::Detailed.taxonomy(), "ดีมาก");
        assert!(prompt.ends_with("ข้อความที่จะให้วิเคราะห์:\n\"ดีมาก\"\n"));
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        let prompt = build_prompt(&TaxonomyPreset::Detailed.taxonomy(), r#"he said "late again""#);
        assert!(prompt.contains(r#""he said \"late again\"""#));
    }

    #[test]
    fn trailing_backslash_does_not_escape_closing_quote() {
        let prompt = build_prompt(&Taxonomy::default(), "ends with \\");
        assert!(prompt.ends_with("\"ends with \\\\\"\n"));
        assert!(!prompt.ends_with("\"ends with \\\"\n"));
    }

    #[test]
    fn backslash_before_quote_stays_distinct() {
        let prompt = build_prompt(&Taxonomy::default(), r#"a\"b"#);
        assert!(prompt.contains(r#""a\\\"b""#));
    }

    #[test]
    fn identical_inputs_give_identical_prompts() {
        let taxonomy = TaxonomyPreset::Detailed.taxonomy();
        let a = build_prompt(&taxonomy, "รถไฟฟ้าเสียบ่อยมาก");
        let b = build_prompt(&taxonomy, "รถไฟฟ้าเสียบ่อยมาก");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn empty_taxonomy_still_builds_a_prompt() {
        let prompt = build_prompt(&Taxonomy::default(), "hello");
        assert!(prompt.contains("[1] หมวดหมู่ (categories):\n\n\n[2]"));
        assert!(prompt.contains("\"hello\""));
    }

    #[test]
    fn custom_taxonomy_order_is_kept() {
        let taxonomy = Taxonomy::new(vec![
            CategoryEntry::new("Zeta", "last letter"),
            CategoryEntry::new("Alpha", "first letter"),
        ])
        .unwrap();
        let prompt = build_prompt(&taxonomy, "x");
        let zeta = prompt.find("- Zeta").unwrap();
        let alpha = prompt.find("- Alpha").unwrap();
        assert!(zeta < alpha);
    }
}
