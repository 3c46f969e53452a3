use serde::{Deserialize, Serialize};

/// One recorded answer. The title is a snapshot of the question label at the
/// time the answer was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub question_title: String,
    pub value: String,
}

impl Answer {
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// Answers keyed by question id, kept in first-insertion order so previews and
/// provider context read in the order the user answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerStore {
    answers: Vec<Answer>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert. Overwrites both value and title of an existing answer.
    pub fn set_answer(&mut self, question_id: &str, title: &str, value: &str) {
        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => {
                existing.question_title = title.to_string();
                existing.value = value.to_string();
            }
            None => self.answers.push(Answer {
                question_id: question_id.to_string(),
                question_title: title.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Updates the value of an existing answer; silently does nothing otherwise.
    pub fn update_answer(&mut self, question_id: &str, value: &str) {
        if let Some(existing) = self.answers.iter_mut().find(|a| a.question_id == question_id) {
            existing.value = value.to_string();
        }
    }

    pub fn get_answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Removes the answer entirely and hands it back.
    pub fn clear_answer(&mut self, question_id: &str) -> Option<Answer> {
        let idx = self.answers.iter().position(|a| a.question_id == question_id)?;
        Some(self.answers.remove(idx))
    }

    pub fn value(&self, question_id: &str) -> Option<&str> {
        self.get_answer(question_id).map(|a| a.value.as_str())
    }

    /// True when the answer exists and is non-empty after trimming.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get_answer(question_id).map(Answer::is_filled).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.question_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_and_size_counts_distinct_ids() {
        let mut store = AnswerStore::new();
        let writes = [
            ("platform", "TikTok"),
            ("product_name", "GlowSerum"),
            ("platform", "Instagram"),
            ("product_name", "BrightDrop"),
            ("wardrobe", "casual"),
            ("platform", "YouTube"),
        ];
        for (id, value) in writes {
            store.set_answer(id, "title", value);
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.value("platform"), Some("YouTube"));
        assert_eq!(store.value("product_name"), Some("BrightDrop"));
        assert_eq!(store.value("wardrobe"), Some("casual"));
    }

    #[test]
    fn set_overwrites_title() {
        let mut store = AnswerStore::new();
        store.set_answer("scene_2", "Scene 3", "walk in");
        store.set_answer("scene_2", "Scene 2", "walk in");
        assert_eq!(store.get_answer("scene_2").unwrap().question_title, "Scene 2");
    }

    #[test]
    fn update_only_touches_existing_answers() {
        let mut store = AnswerStore::new();
        store.update_answer("city", "Austin");
        assert!(store.get_answer("city").is_none());

        store.set_answer("city", "City", "Dallas");
        store.update_answer("city", "Austin");
        let a = store.get_answer("city").unwrap();
        assert_eq!(a.value, "Austin");
        assert_eq!(a.question_title, "City");
    }

    #[test]
    fn whitespace_is_stored_but_not_answered() {
        let mut store = AnswerStore::new();
        store.set_answer("wardrobe", "Wardrobe", "   ");
        assert_eq!(store.value("wardrobe"), Some("   "));
        assert!(!store.is_answered("wardrobe"));
        assert!(!store.is_answered("missing"));
    }

    #[test]
    fn clear_returns_removed_answer_and_keeps_order() {
        let mut store = AnswerStore::new();
        store.set_answer("a", "A", "1");
        store.set_answer("b", "B", "2");
        store.set_answer("c", "C", "3");
        let removed = store.clear_answer("b").unwrap();
        assert_eq!(removed.value, "2");
        assert_eq!(store.ids(), vec!["a".to_string(), "c".to_string()]);
        assert!(store.clear_answer("b").is_none());
    }
}
