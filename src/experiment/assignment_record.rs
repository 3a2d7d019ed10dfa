//! Assignment Record - the sticky (user, experiment) -> variant mapping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device class derived from a User-Agent string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Desktop browser.
    Desktop,
    /// Phone-class device.
    Mobile,
    /// Tablet-class device.
    Tablet,
    /// No User-Agent, or one that matched no known class.
    #[default]
    Unknown,
}

impl DeviceType {
    /// Classify a User-Agent header value.
    ///
    /// Tablets are checked before phones: an Android UA without the
    /// `mobile` token is a tablet.
    #[must_use]
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(raw) = user_agent else {
            return Self::Unknown;
        };
        let ua = raw.to_lowercase();

        let tablet = ["ipad", "tablet", "playbook", "silk"]
            .iter()
            .any(|marker| ua.contains(marker));
        if tablet || (ua.contains("android") && !ua.contains("mobile")) {
            return Self::Tablet;
        }

        let mobile = [
            "mobile",
            "iphone",
            "ipod",
            "android",
            "blackberry",
            "windows phone",
            "webos",
        ]
        .iter()
        .any(|marker| ua.contains(marker));
        if mobile {
            return Self::Mobile;
        }

        let desktop = ["windows", "macintosh", "linux", "x11"]
            .iter()
            .any(|marker| ua.contains(marker));
        if desktop {
            return Self::Desktop;
        }

        Self::Unknown
    }

    /// Lowercase label for segment grouping and serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the variant for an assignment was chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    /// Deterministic hash of the user id (the storefront default).
    #[default]
    Hash,
    /// Hand-picked by an operator.
    Manual,
    /// Forced through a preview/QA override.
    Override,
}

/// User context captured at assignment time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentContext {
    /// Raw User-Agent header, if the caller had one.
    pub user_agent: Option<String>,
    /// Device class derived from the User-Agent.
    pub device_type: DeviceType,
    /// ISO country code, when known.
    pub country: Option<String>,
    /// How the variant was chosen.
    pub method: AssignmentMethod,
}

impl AssignmentContext {
    /// Build a context from a User-Agent header, classifying the device.
    #[must_use]
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        Self {
            user_agent: user_agent.map(str::to_string),
            device_type: DeviceType::from_user_agent(user_agent),
            country: None,
            method: AssignmentMethod::Hash,
        }
    }
}

/// Assignment Record pins one user to one variant of one experiment.
///
/// Created exactly once per (user, experiment) pair by the registry's
/// assign-if-absent operation and immutable afterward. `is_new_visitor`
/// is a snapshot taken at creation time: whether this user had never been
/// assigned to any experiment before this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentRecord {
    user_id: String,
    experiment_id: String,
    variant_id: String,
    assigned_at: DateTime<Utc>,
    is_new_visitor: bool,
    context: AssignmentContext,
}

impl AssignmentRecord {
    /// Create a new assignment record stamped with the current time.
    ///
    /// `is_new_visitor` must be decided by the registry inside the same
    /// critical section as the insert.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        is_new_visitor: bool,
        context: AssignmentContext,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            assigned_at: Utc::now(),
            is_new_visitor,
            context,
        }
    }

    /// Get the user ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the variant this user is pinned to.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the assignment timestamp.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Whether this was the user's first assignment anywhere, frozen at
    /// creation time.
    #[must_use]
    pub const fn is_new_visitor(&self) -> bool {
        self.is_new_visitor
    }

    /// Get the context captured at assignment time.
    #[must_use]
    pub const fn context(&self) -> &AssignmentContext {
        &self.context
    }
}
