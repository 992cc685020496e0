//! Artwork model
//!
//! This module provides:
//! - `Artwork` entity and its category/approval enums
//! - Input types for creating and updating artworks
//! - Filter and pagination types shared by all list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Artwork entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    /// Unique identifier
    pub id: i64,
    /// Artwork title
    pub title: String,
    /// Artwork description
    pub description: String,
    /// Image path
    pub image: String,
    /// Category
    pub category: ArtworkCategory,
    /// Owning artist user ID (immutable after creation)
    pub artist_id: i64,
    /// Moderation state
    pub approval_status: ApprovalStatus,
    /// Moderator feedback (required when rejected)
    pub feedback: Option<String>,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Artwork {
    /// Create a new pending artwork for the given artist
    pub fn new(
        title: String,
        description: String,
        image: String,
        category: ArtworkCategory,
        artist_id: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            title,
            description,
            image,
            category,
            artist_id,
            approval_status: ApprovalStatus::Pending,
            feedback: None,
            submitted_at: now,
            updated_at: now,
        }
    }
}

/// Artwork category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkCategory {
    Sketch,
    Canvas,
    Wallart,
    Digital,
    Photography,
}

impl Default for ArtworkCategory {
    fn default() -> Self {
        Self::Sketch
    }
}

impl fmt::Display for ArtworkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtworkCategory::Sketch => write!(f, "sketch"),
            ArtworkCategory::Canvas => write!(f, "canvas"),
            ArtworkCategory::Wallart => write!(f, "wallart"),
            ArtworkCategory::Digital => write!(f, "digital"),
            ArtworkCategory::Photography => write!(f, "photography"),
        }
    }
}

impl FromStr for ArtworkCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sketch" => Ok(ArtworkCategory::Sketch),
            "canvas" => Ok(ArtworkCategory::Canvas),
            "wallart" => Ok(ArtworkCategory::Wallart),
            "digital" => Ok(ArtworkCategory::Digital),
            "photography" => Ok(ArtworkCategory::Photography),
            _ => Err(anyhow::anyhow!("Invalid artwork category: {}", s)),
        }
    }
}

/// Moderation state of an artwork.
///
/// pending (initial) → approved | rejected. Rejection always carries
/// feedback text for the artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid approval status: {}", s)),
        }
    }
}

/// Input for submitting a new artwork. The artist is never taken from the
/// body; it is always the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArtworkInput {
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(default)]
    pub category: ArtworkCategory,
}

/// Input for updating an artwork (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArtworkInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<ArtworkCategory>,
}

/// Filter for artwork list queries
#[derive(Debug, Clone, Default)]
pub struct ArtworkFilter {
    /// Filter by moderation state
    pub approval_status: Option<ApprovalStatus>,
    /// Filter by owning artist
    pub artist_id: Option<i64>,
    /// Text search over title and description
    pub search: Option<String>,
    /// Order newest-first by submission date (default true)
    pub newest_first: bool,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        // Widen before multiplying; page is client-controlled
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages = (self.total + self.per_page as i64 - 1) / self.per_page as i64;
        pages.max(0) as u32
    }
}
