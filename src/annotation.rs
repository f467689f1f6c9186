/// [crate::annotation] is the only point of contact with a host text-annotation framework. A
/// host annotation is anything that can report its offsets, type name and covered text; it is
/// converted once into a plain [TextSpanAnnotation] record and never referenced again.
use serde::{Deserialize, Serialize};

use crate::{error::SpanGraphError, label::MutableSpanTextLabel, properties::Span};

/// The view of a host framework annotation needed to build a [TextSpanAnnotation].
pub trait HostAnnotation {
    fn begin(&self) -> usize;
    fn end(&self) -> usize;
    /// The host's type name, possibly namespace-qualified (e.g. `org.example.Claim`).
    fn type_name(&self) -> &str;
    fn covered_text(&self) -> &str;
}

/// Plain span annotation record produced from a host annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpanAnnotation {
    pub begin: usize,
    pub end: usize,
    pub label: String,
    pub covered_text: String,
}

impl TextSpanAnnotation {
    pub fn span(&self) -> Result<Span, SpanGraphError> {
        Span::new(self.begin, self.end)
    }

    /// Convert into a graph node candidate with no attributes.
    pub fn into_label(self) -> Result<MutableSpanTextLabel, SpanGraphError> {
        let span = self.span()?;
        Ok(MutableSpanTextLabel::new(span, self.label, None).with_covered_text(self.covered_text))
    }
}

/// Unqualified form of a host type name: the segment after the last `.`.
pub fn short_type_name(type_name: &str) -> &str {
    type_name
        .rsplit_once('.')
        .map(|(_, short)| short)
        .unwrap_or(type_name)
}

pub fn from_host_annotation<A: HostAnnotation + ?Sized>(annotation: &A) -> TextSpanAnnotation {
    TextSpanAnnotation {
        begin: annotation.begin(),
        end: annotation.end(),
        label: short_type_name(annotation.type_name()).to_string(),
        covered_text: annotation.covered_text().to_string(),
    }
}
