//! Labeled text spans, the node type of a [crate::graph::SpanAnnotationGraph].
//!
//! Two variants share the [SpanTextLabel] contract:
//!
//! - [MutableSpanTextLabel] exposes setters for building and correcting annotations before they
//!   are placed in a graph. Mutating a label after insertion desynchronizes the graph's reverse
//!   lookup and span index; callers must not do so.
//! - [ImmutableSpanTextLabel] is fixed at construction. Wrap it in an [Arc] to share one label
//!   between several graphs without copying.
//!
//! Label identity is `(span, label, attributes)`. Covered text is display data: two labels that
//! differ only in covered text (e.g. after upstream re-tokenization) are the same node.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    error::SpanGraphError,
    properties::{Attributes, Span},
};

/// Read access shared by every label variant.
pub trait SpanTextLabel {
    fn span(&self) -> Span;
    fn label(&self) -> &str;
    fn attributes(&self) -> Option<&Attributes>;
    fn covered_text(&self) -> Option<&str>;
}

impl<T: SpanTextLabel + ?Sized> SpanTextLabel for Arc<T> {
    fn span(&self) -> Span {
        (**self).span()
    }

    fn label(&self) -> &str {
        (**self).label()
    }

    fn attributes(&self) -> Option<&Attributes> {
        (**self).attributes()
    }

    fn covered_text(&self) -> Option<&str> {
        (**self).covered_text()
    }
}

/// Wire shape of a label: `{"textSpan": {"begin", "end", "text"?}, "label", "attrs"}`.
#[derive(Serialize, Deserialize)]
struct LabelRecord {
    #[serde(rename = "textSpan")]
    text_span: SpanTextRecord,
    label: String,
    attrs: Option<Attributes>,
}

#[derive(Serialize, Deserialize)]
struct SpanTextRecord {
    begin: usize,
    end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl LabelRecord {
    fn from_label<L: SpanTextLabel>(label: &L) -> Self {
        let span = label.span();
        LabelRecord {
            text_span: SpanTextRecord {
                begin: span.begin(),
                end: span.end(),
                text: label.covered_text().map(str::to_string),
            },
            label: label.label().to_string(),
            attrs: label.attributes().cloned(),
        }
    }
}

/// A label that can be corrected in place until it is frozen into a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "LabelRecord", try_from = "LabelRecord")]
pub struct MutableSpanTextLabel {
    span: Span,
    covered_text: Option<String>,
    label: String,
    attributes: Option<Attributes>,
}

impl MutableSpanTextLabel {
    pub fn new<S: Into<String>>(span: Span, label: S, attributes: Option<Attributes>) -> Self {
        MutableSpanTextLabel {
            span,
            covered_text: None,
            label: label.into(),
            attributes,
        }
    }

    pub fn with_covered_text<S: Into<String>>(mut self, text: S) -> Self {
        self.covered_text = Some(text.into());
        self
    }

    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn set_label<S: Into<String>>(&mut self, label: S) {
        self.label = label.into();
    }

    pub fn set_attributes(&mut self, attributes: Option<Attributes>) {
        self.attributes = attributes;
    }

    pub fn set_covered_text(&mut self, text: Option<String>) {
        self.covered_text = text;
    }

    /// Mutable access to the attribute map, creating an empty one when absent.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        self.attributes.get_or_insert_with(Attributes::new)
    }

    pub fn freeze(self) -> ImmutableSpanTextLabel {
        ImmutableSpanTextLabel {
            span: self.span,
            covered_text: self.covered_text,
            label: self.label,
            attributes: self.attributes,
        }
    }
}

impl SpanTextLabel for MutableSpanTextLabel {
    fn span(&self) -> Span {
        self.span
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    fn covered_text(&self) -> Option<&str> {
        self.covered_text.as_deref()
    }
}

impl Hash for MutableSpanTextLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.span.hash(state);
        self.label.hash(state);
        self.attributes.hash(state);
    }
}

impl PartialEq for MutableSpanTextLabel {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span && self.label == other.label && self.attributes == other.attributes
    }
}

impl Eq for MutableSpanTextLabel {}

impl Display for MutableSpanTextLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_label(f, "MutableSpanTextLabel", self)
    }
}

impl From<MutableSpanTextLabel> for LabelRecord {
    fn from(label: MutableSpanTextLabel) -> Self {
        LabelRecord::from_label(&label)
    }
}

impl TryFrom<LabelRecord> for MutableSpanTextLabel {
    type Error = SpanGraphError;

    fn try_from(record: LabelRecord) -> Result<Self, Self::Error> {
        let span = Span::new(record.text_span.begin, record.text_span.end)?;
        Ok(MutableSpanTextLabel {
            span,
            covered_text: record.text_span.text,
            label: record.label,
            attributes: record.attrs,
        })
    }
}

/// A label whose fields are fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "LabelRecord", try_from = "LabelRecord")]
pub struct ImmutableSpanTextLabel {
    span: Span,
    covered_text: Option<String>,
    label: String,
    attributes: Option<Attributes>,
}

impl ImmutableSpanTextLabel {
    pub fn new<S: Into<String>>(span: Span, label: S, attributes: Option<Attributes>) -> Self {
        ImmutableSpanTextLabel {
            span,
            covered_text: None,
            label: label.into(),
            attributes,
        }
    }

    pub fn with_covered_text<S: Into<String>>(mut self, text: S) -> Self {
        self.covered_text = Some(text.into());
        self
    }

    /// Copy this label into a new mutable one, e.g. to correct it for another graph.
    pub fn to_mutable(&self) -> MutableSpanTextLabel {
        MutableSpanTextLabel {
            span: self.span,
            covered_text: self.covered_text.clone(),
            label: self.label.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl SpanTextLabel for ImmutableSpanTextLabel {
    fn span(&self) -> Span {
        self.span
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    fn covered_text(&self) -> Option<&str> {
        self.covered_text.as_deref()
    }
}

impl Hash for ImmutableSpanTextLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.span.hash(state);
        self.label.hash(state);
        self.attributes.hash(state);
    }
}

impl PartialEq for ImmutableSpanTextLabel {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span && self.label == other.label && self.attributes == other.attributes
    }
}

impl Eq for ImmutableSpanTextLabel {}

impl Display for ImmutableSpanTextLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_label(f, "ImmutableSpanTextLabel", self)
    }
}

impl From<MutableSpanTextLabel> for ImmutableSpanTextLabel {
    fn from(label: MutableSpanTextLabel) -> Self {
        label.freeze()
    }
}

impl From<ImmutableSpanTextLabel> for LabelRecord {
    fn from(label: ImmutableSpanTextLabel) -> Self {
        LabelRecord::from_label(&label)
    }
}

impl TryFrom<LabelRecord> for ImmutableSpanTextLabel {
    type Error = SpanGraphError;

    fn try_from(record: LabelRecord) -> Result<Self, Self::Error> {
        MutableSpanTextLabel::try_from(record).map(MutableSpanTextLabel::freeze)
    }
}

fn write_label<L: SpanTextLabel>(f: &mut Formatter<'_>, name: &str, label: &L) -> std::fmt::Result {
    write!(f, "{name} [span={}, label={}", label.span(), label.label())?;
    if let Some(text) = label.covered_text() {
        write!(f, ", text={text:?}")?;
    }
    match label.attributes() {
        Some(attrs) => write!(f, ", attrs={attrs:?}]"),
        None => write!(f, ", attrs=null]"),
    }
}
