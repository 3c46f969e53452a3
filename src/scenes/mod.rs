use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::AnswerStore;

pub const MIN_SCENES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub content: String,
}

impl Scene {
    fn empty(ordinal: usize) -> Self {
        Self { id: scene_id(ordinal), content: String::new() }
    }
}

pub fn scene_id(ordinal: usize) -> String {
    format!("scene_{ordinal}")
}

pub fn scene_title(ordinal: usize) -> String {
    format!("Scene {ordinal}")
}

/// Ordered scene list, never shorter than two. Ids are kept contiguous
/// (`scene_1..scene_N`): removing a scene renumbers the ones after it and
/// re-keys their mirrored answers, so id suffix and ordinal always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneList {
    scenes: Vec<Scene>,
}

impl Default for SceneList {
    fn default() -> Self {
        Self { scenes: (1..=MIN_SCENES).map(Scene::empty).collect() }
    }
}

impl SceneList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// 1-based position of the scene.
    pub fn ordinal(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id).map(|i| i + 1)
    }

    pub fn can_remove(&self) -> bool {
        self.scenes.len() > MIN_SCENES
    }

    /// Appends an empty scene and returns its id.
    pub fn add_scene(&mut self) -> String {
        let scene = Scene::empty(self.scenes.len() + 1);
        let id = scene.id.clone();
        self.scenes.push(scene);
        id
    }

    /// Removes a scene and its mirrored answer. No-op at the floor of two or
    /// for unknown ids. Returns whether anything was removed.
    pub fn remove_scene(&mut self, id: &str, answers: &mut AnswerStore) -> bool {
        if !self.can_remove() {
            debug!(scene = id, "scene removal refused at minimum length");
            return false;
        }
        let Some(idx) = self.scenes.iter().position(|s| s.id == id) else {
            return false;
        };
        self.scenes.remove(idx);
        answers.clear_answer(id);

        for (pos, scene) in self.scenes.iter_mut().enumerate().skip(idx) {
            let ordinal = pos + 1;
            let new_id = scene_id(ordinal);
            if let Some(prev) = answers.clear_answer(&scene.id) {
                answers.set_answer(&new_id, &scene_title(ordinal), &prev.value);
            }
            scene.id = new_id;
        }
        true
    }

    /// Sets the scene content and mirrors it into the answers under the same id,
    /// titled by ordinal. Unknown ids are ignored.
    pub fn update_scene_content(&mut self, id: &str, content: &str, answers: &mut AnswerStore) {
        let Some(pos) = self.scenes.iter().position(|s| s.id == id) else {
            return;
        };
        self.scenes[pos].content = content.to_string();
        answers.set_answer(id, &scene_title(pos + 1), content);
    }

    /// The first two scenes must have non-empty trimmed content.
    pub fn gate_satisfied(&self) -> bool {
        self.scenes.len() >= MIN_SCENES
            && self.scenes[..MIN_SCENES].iter().all(|s| !s.content.trim().is_empty())
    }

    /// First of the required scenes still empty, if any.
    pub fn first_unfilled_required(&self) -> Option<&Scene> {
        self.scenes.iter().take(MIN_SCENES).find(|s| s.content.trim().is_empty())
    }
}
