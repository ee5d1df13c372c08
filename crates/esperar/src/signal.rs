//! Typed page signals and interactive-click gating.
//!
//! The host page resolves a raw click to the nearest interactive element
//! (button, link, `role="button"`, submit control) and describes it as a
//! [`ClickTarget`]; the gating rules here decide whether that click starts a
//! tracked operation. Lifecycle events arrive as the other [`PageSignal`]
//! variants and are mapped onto the tracker by the page session.

use serde::{Deserialize, Serialize};

/// Classes that exempt a control from loading-state bookkeeping
const EXEMPT_CLASSES: &[&str] = &[
    "js-ignore-loading",
    "btn-close",
    "btn-secondary",
    "dropdown-toggle",
];

/// Toggle affordances that open an in-page surface instead of navigating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAttr {
    /// Opens a dropdown menu
    Dropdown,
    /// Opens a modal dialog
    Modal,
    /// Switches a tab panel
    Tab,
    /// Shows a tooltip
    Tooltip,
}

/// A resolved interactive click target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickTarget {
    /// `href` attribute, when the element resolves to a link
    pub href: Option<String>,
    /// Whether the element is a submit control
    pub submit: bool,
    /// Class list of the element
    pub classes: Vec<String>,
    /// Toggle affordance carried by the element, if any
    pub toggle: Option<ToggleAttr>,
    /// Whether the element dismisses a surface (close button)
    pub dismiss: bool,
    /// Whether the element carries a download attribute
    pub download: bool,
    /// Whether the element is a page link inside a pagination control
    pub pagination_link: bool,
}

impl ClickTarget {
    /// A plain link with the given `href`
    #[must_use]
    pub fn link(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// A submit control
    #[must_use]
    pub fn submit_control() -> Self {
        Self {
            submit: true,
            ..Self::default()
        }
    }

    /// Add a class to the element's class list
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Mark the element with a toggle affordance
    #[must_use]
    pub const fn with_toggle(mut self, toggle: ToggleAttr) -> Self {
        self.toggle = Some(toggle);
        self
    }

    /// Mark the element as a dismiss control
    #[must_use]
    pub const fn with_dismiss(mut self) -> Self {
        self.dismiss = true;
        self
    }

    /// Mark the element with a download attribute
    #[must_use]
    pub const fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    /// Mark the element as a pagination page link
    #[must_use]
    pub const fn in_pagination(mut self) -> Self {
        self.pagination_link = true;
        self
    }

    /// Whether the `href` represents a real navigation
    ///
    /// Fragment-only and script hrefs stay on the page and never produce a
    /// load cycle.
    #[must_use]
    pub fn has_navigation_href(&self) -> bool {
        match &self.href {
            Some(href) => href != "#" && !href.starts_with("javascript:"),
            None => false,
        }
    }

    /// Whether the element carries any affordance exempting it from
    /// bookkeeping
    #[must_use]
    pub fn is_exempt(&self) -> bool {
        self.dismiss
            || self.download
            || self.toggle.is_some()
            || self.pagination_link
            || self
                .classes
                .iter()
                .any(|class| EXEMPT_CLASSES.contains(&class.as_str()))
    }

    /// Whether this click starts a tracked operation
    #[must_use]
    pub fn starts_operation(&self) -> bool {
        !self.is_exempt() && (self.has_navigation_href() || self.submit)
    }
}

/// Browser-dispatched lifecycle and input signals driving the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PageSignal {
    /// Click on an interactive element
    Click(ClickTarget),
    /// A form was submitted
    FormSubmit,
    /// The page is about to unload
    BeforeUnload,
    /// The page finished its initial load
    Loaded,
    /// The page was shown, possibly restored from the history cache
    PageShow {
        /// True when restored from a bfcache snapshot rather than loaded
        persisted: bool,
    },
    /// The page's visibility changed
    VisibilityChanged {
        /// True when the page became visible again
        visible: bool,
    },
}
