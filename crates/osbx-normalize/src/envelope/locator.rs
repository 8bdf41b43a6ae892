use serde::Deserialize;

use super::dom::{Document, NodeId};

/// One move through the node tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    FirstChild,
    NextSibling,
}

/// Path from the document element to the node holding an envelope payload.
///
/// The default path is first child, then its next sibling, then that
/// node's first child. With an export's usual layout (root element,
/// whitespace, wrapper element, CDATA) this lands on the CDATA section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeLocator {
    steps: Vec<Step>,
}

impl Default for EnvelopeLocator {
    fn default() -> Self {
        Self {
            steps: vec![Step::FirstChild, Step::NextSibling, Step::FirstChild],
        }
    }
}

impl EnvelopeLocator {
    pub fn new(steps: impl Into<Vec<Step>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Follow the steps from the document element. `None` as soon as a step
    /// has nowhere to go.
    pub fn locate(&self, doc: &Document) -> Option<NodeId> {
        self.steps.iter().try_fold(doc.root(), |node, step| match step {
            Step::FirstChild => doc.first_child(node),
            Step::NextSibling => doc.next_sibling(node),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::dom::NodeKind;

    #[test]
    fn default_path_reaches_wrapped_cdata() {
        let doc = Document::parse(b"<root>\n  <wrapper><![CDATA[payload]]></wrapper>\n</root>").unwrap();

        let node = EnvelopeLocator::default().locate(&doc).unwrap();

        assert_eq!(doc.kind(node), &NodeKind::CData(b"payload".to_vec()));
    }

    #[test]
    fn missing_node_is_none() {
        let doc = Document::parse(b"<root><only/></root>").unwrap();
        assert_eq!(EnvelopeLocator::default().locate(&doc), None);
    }

    #[test]
    fn empty_path_is_the_document_element() {
        let doc = Document::parse(b"<root/>").unwrap();
        assert_eq!(EnvelopeLocator::new(vec![]).locate(&doc), Some(doc.root()));
    }

    #[test]
    fn steps_deserialize_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            steps: Vec<Step>,
        }
        let parsed: Wrapper =
            toml::from_str(r#"steps = ["first-child", "next-sibling"]"#).unwrap();
        assert_eq!(parsed.steps, vec![Step::FirstChild, Step::NextSibling]);
    }
}
