use chrono::Utc;
use shared::domain::{Priority, TodoId, TodoItem};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("todo title must not be empty")]
    EmptyTitle,
    #[error("todo {0} not found")]
    NotFound(TodoId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TodoFilter {
    pub fn matches(self, item: &TodoItem) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Active => !item.completed,
            TodoFilter::Completed => item.completed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// In-memory todo list, newest first.
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    items: Vec<TodoItem>,
    last_id: i64,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples() -> Self {
        let mut list = Self::new();
        let samples = [
            ("Optimize the interface", "Polish layout and interactions", Priority::Low, true),
            ("Round out app features", "Add more practical modules", Priority::Medium, false),
            ("Learn React Native", "Finish the basics and a practice project", Priority::High, false),
        ];
        for (title, description, priority, completed) in samples {
            list.prepend(title.to_string(), Some(description.to_string()), priority, completed);
        }
        list
    }

    fn next_id(&mut self) -> TodoId {
        self.last_id = Utc::now().timestamp_millis().max(self.last_id + 1);
        TodoId(self.last_id)
    }

    fn prepend(
        &mut self,
        title: String,
        description: Option<String>,
        priority: Priority,
        completed: bool,
    ) -> TodoId {
        let id = self.next_id();
        self.items.insert(
            0,
            TodoItem {
                id,
                title,
                description,
                completed,
                created_at: Utc::now(),
                priority,
            },
        );
        id
    }

    pub fn add(&mut self, draft: NewTodo) -> Result<TodoId, TodoError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle);
        }
        let description = draft.description.trim();

        Ok(self.prepend(
            title.to_string(),
            (!description.is_empty()).then(|| description.to_string()),
            draft.priority,
            false,
        ))
    }

    /// Flips completion and returns the new state.
    pub fn toggle(&mut self, id: TodoId) -> Result<bool, TodoError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))?;
        item.completed = !item.completed;
        Ok(item.completed)
    }

    pub fn remove(&mut self, id: TodoId) -> Result<TodoItem, TodoError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn filtered(&self, filter: TodoFilter) -> impl Iterator<Item = &TodoItem> + '_ {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/todo_tests.rs"]
mod tests;
