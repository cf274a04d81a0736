use crate::domain::model::QuizletCard;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSideLabel {
    Word,
    Definition,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudiableItemsResponse {
    #[serde(default)]
    pub responses: Vec<StudiableItemsPage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudiableItemsPage {
    #[serde(default)]
    pub models: StudiableModels,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudiableModels {
    #[serde(default, rename = "studiableItem")]
    pub studiable_item: Vec<StudiableItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudiableItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "cardSides")]
    pub card_sides: Vec<CardSide>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CardSide {
    #[serde(default)]
    pub label: CardSideLabel,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Media {
    #[serde(default, rename = "plainText")]
    pub plain_text: Option<String>,
}

impl StudiableItem {
    fn side_text(&self, label: CardSideLabel) -> Option<&str> {
        self.card_sides
            .iter()
            .filter(|side| side.label == label)
            .find_map(|side| side.media.first())
            .and_then(|media| media.plain_text.as_deref())
    }

    /// Both the word and the definition side must carry text.
    pub fn to_card(&self) -> Option<QuizletCard> {
        let front = self.side_text(CardSideLabel::Word)?;
        let back = self.side_text(CardSideLabel::Definition)?;

        if front.trim().is_empty() || back.trim().is_empty() {
            return None;
        }

        Some(QuizletCard {
            front: front.to_string(),
            back: back.to_string(),
        })
    }
}

impl StudiableItemsResponse {
    /// Cards of the first page, in source order. `None` when the page list is empty.
    pub fn into_cards(self) -> Option<Vec<QuizletCard>> {
        let page = self.responses.into_iter().next()?;

        let cards = page
            .models
            .studiable_item
            .iter()
            .filter_map(|item| {
                let card = item.to_card();
                if card.is_none() {
                    tracing::debug!(item_id = item.id, "studiable item skipped: incomplete sides");
                }
                card
            })
            .collect();

        Some(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn side(label: &str, text: &str) -> serde_json::Value {
        json!({ "label": label, "media": [{ "type": 1, "plainText": text }] })
    }

    fn response(items: serde_json::Value) -> StudiableItemsResponse {
        serde_json::from_value(json!({
            "responses": [{ "models": { "studiableItem": items } }]
        }))
        .unwrap()
    }

    #[test]
    fn test_extracts_word_and_definition() {
        let parsed = response(json!([
            { "id": 1, "cardSides": [side("word", "cat"), side("definition", "gato")] }
        ]));

        assert_eq!(
            parsed.into_cards().unwrap(),
            vec![QuizletCard {
                front: "cat".to_string(),
                back: "gato".to_string()
            }]
        );
    }

    #[test]
    fn test_item_without_definition_is_dropped() {
        let parsed = response(json!([
            { "id": 1, "cardSides": [side("word", "cat")] },
            { "id": 2, "cardSides": [side("word", "dog"), side("definition", "perro")] }
        ]));

        let cards = parsed.into_cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "dog");
    }

    #[test]
    fn test_empty_text_and_empty_media_are_ignored() {
        let parsed = response(json!([
            { "id": 1, "cardSides": [side("word", ""), side("definition", "nada")] },
            { "id": 2, "cardSides": [
                { "label": "word", "media": [] },
                side("word", "uno"),
                side("definition", "one")
            ] }
        ]));

        let cards = parsed.into_cards().unwrap();
        assert_eq!(
            cards,
            vec![QuizletCard {
                front: "uno".to_string(),
                back: "one".to_string()
            }]
        );
    }

    #[test]
    fn test_whitespace_only_side_is_dropped() {
        let parsed = response(json!([
            { "id": 1, "cardSides": [side("word", "cat"), side("definition", "gato")] },
            { "id": 2, "cardSides": [side("word", "blank"), side("definition", " \n ")] },
            { "id": 3, "cardSides": [side("word", "\t"), side("definition", "tab")] }
        ]));

        let cards = parsed.into_cards().unwrap();
        assert_eq!(
            cards,
            vec![QuizletCard {
                front: "cat".to_string(),
                back: "gato".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_labels_and_order() {
        let parsed = response(json!([
            { "id": 1, "cardSides": [side("definition", "b"), side("image", "x"), side("word", "a")] },
            { "id": 2, "cardSides": [side("word", "c"), side("definition", "d")] }
        ]));

        let fronts: Vec<_> = parsed
            .into_cards()
            .unwrap()
            .into_iter()
            .map(|card| card.front)
            .collect();
        assert_eq!(fronts, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_responses_yield_none() {
        let parsed: StudiableItemsResponse =
            serde_json::from_value(json!({ "responses": [] })).unwrap();
        assert!(parsed.into_cards().is_none());

        let missing: StudiableItemsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(missing.into_cards().is_none());
    }
}
