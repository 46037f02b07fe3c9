use std::collections::HashMap;

use histd_db::TopicId;

/// 토픽 이름 <-> id 양방향 맵
#[derive(Debug, Clone, Default)]
pub struct TopicMap {
    by_name: HashMap<String, TopicId>,
    by_id: HashMap<TopicId, String>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, id: TopicId) {
        self.by_id.insert(id, name.clone());
        self.by_name.insert(name, id);
    }

    pub fn id(&self, name: &str) -> Option<TopicId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: TopicId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<(String, TopicId)> for TopicMap {
    fn from_iter<I: IntoIterator<Item = (String, TopicId)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, id) in iter {
            map.insert(name, id);
        }
        map
    }
}
