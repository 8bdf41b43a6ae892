//! Recovery of literal payloads that the export wraps in a markup envelope.
//!
//! An exported XQuery or XSLT resource is not the script itself but a small
//! XML document carrying the script as a CDATA section. When a file parses
//! and the node at the [`EnvelopeLocator`] path is CDATA, the file is
//! replaced by that CDATA content. Anything else is left untouched.

mod decode;
mod dom;
mod locator;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

pub use dom::{Document, NodeId, NodeKind, ParseError};
pub use locator::{EnvelopeLocator, Step};

#[derive(Debug)]
pub enum UnwrapOutcome {
    /// The file could not be read or did not parse as markup.
    NotMarkup,
    /// Parsed, but no CDATA at the envelope location.
    NoEnvelope,
    /// The file now holds exactly the recovered payload.
    Unwrapped { bytes: usize },
    /// The payload was found but writing it back failed; the file still
    /// holds the envelope.
    WriteFailed(osbx_fs::Error),
}

impl UnwrapOutcome {
    pub fn is_unwrapped(&self) -> bool {
        matches!(self, Self::Unwrapped { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::WriteFailed(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Unwrapper {
    locator: EnvelopeLocator,
}

impl Unwrapper {
    pub fn new(locator: EnvelopeLocator) -> Self {
        Self { locator }
    }

    /// Payload carried by `content`, if it is an envelope.
    pub fn payload(&self, content: &[u8]) -> Result<Option<Vec<u8>>, ParseError> {
        let doc = Document::parse(content)?;
        let payload = self.locator.locate(&doc).and_then(|node| match doc.kind(node) {
            NodeKind::CData(data) => Some(normalize_line_endings(data)),
            _ => None,
        });
        Ok(payload)
    }

    pub fn unwrap_file(&self, path: &Path) -> UnwrapOutcome {
        let content = match fs::read(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable, not unwrapping");
                return UnwrapOutcome::NotMarkup;
            }
        };

        let payload = match self.payload(&content) {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!(path = %path.display(), "no envelope");
                return UnwrapOutcome::NoEnvelope;
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "not markup");
                return UnwrapOutcome::NotMarkup;
            }
        };

        match osbx_fs::atomic_write(path, &payload) {
            Ok(()) => {
                debug!(path = %path.display(), bytes = payload.len(), "unwrapped");
                UnwrapOutcome::Unwrapped {
                    bytes: payload.len(),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write unwrapped payload");
                UnwrapOutcome::WriteFailed(e)
            }
        }
    }
}

/// `\r\n` and lone `\r` become `\n`, as an XML processor reports them.
fn normalize_line_endings(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut bytes = data.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            bytes.next_if_eq(&b'\n');
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}
