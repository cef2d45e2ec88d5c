// Data models for the served resources

use crate::error::{Result, StoreError};
use crate::record::{Record, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a blog post title, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// Reject blank text and, when `max` is given, text longer than `max` chars
fn check_text(field: &str, value: &str, max: Option<usize>) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} must not be empty", field)));
    }
    if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            return Err(StoreError::validation(format!(
                "{} too long: {} chars (max {})",
                field, len, max
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Blog posts
// ============================================================================

/// Blog post with a server-assigned integer id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub published_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogPostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Validate for BlogPostDraft {
    fn validate(&self) -> Result<()> {
        check_text("title", &self.title, Some(MAX_TITLE_LEN))?;
        check_text("content", &self.content, None)
    }
}

impl Validate for BlogPostPatch {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            check_text("title", title, Some(MAX_TITLE_LEN))?;
        }
        if let Some(content) = &self.content {
            check_text("content", content, None)?;
        }
        Ok(())
    }
}

impl Record for BlogPost {
    type Id = u64;
    type Draft = BlogPostDraft;
    type Patch = BlogPostPatch;

    fn collection_name() -> &'static str {
        "blogposts"
    }

    fn id(&self) -> &u64 {
        &self.id
    }

    fn from_draft(id: u64, draft: BlogPostDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            published_date: created_at,
        }
    }

    fn merge(&mut self, patch: BlogPostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }

    fn replace(&mut self, draft: BlogPostDraft) {
        self.title = draft.title;
        self.content = draft.content;
    }

    fn filter_text(&self) -> &str {
        &self.title
    }
}

// ============================================================================
// Fruits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fruit {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruitDraft {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FruitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Validate for FruitDraft {
    fn validate(&self) -> Result<()> {
        check_text("name", &self.name, None)
    }
}

impl Validate for FruitPatch {
    fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) => check_text("name", name, None),
            None => Ok(()),
        }
    }
}

impl Record for Fruit {
    type Id = u64;
    type Draft = FruitDraft;
    type Patch = FruitPatch;

    fn collection_name() -> &'static str {
        "fruits"
    }

    fn id(&self) -> &u64 {
        &self.id
    }

    fn from_draft(id: u64, draft: FruitDraft, _created_at: DateTime<Utc>) -> Self {
        Self { id, name: draft.name }
    }

    fn merge(&mut self, patch: FruitPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }

    fn replace(&mut self, draft: FruitDraft) {
        self.name = draft.name;
    }

    fn filter_text(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Task with a random UUID id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Validate for TaskDraft {
    fn validate(&self) -> Result<()> {
        check_text("title", &self.title, None)
    }
}

impl Validate for TaskPatch {
    fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) => check_text("title", title, None),
            None => Ok(()),
        }
    }
}

impl Record for Task {
    type Id = Uuid;
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    fn collection_name() -> &'static str {
        "tasks"
    }

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_draft(id: Uuid, draft: TaskDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            created_at,
        }
    }

    fn merge(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    fn replace(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.completed = draft.completed;
    }

    fn filter_text(&self) -> &str {
        &self.title
    }
}
