//! Module instances: shape, behavior, and wire bindings.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::ids::{ModuleId, WireId};
use crate::port::{Direction, PortLayout};

/// What a module does when propagated.
pub enum ModuleKind {
    /// A block with its own behavior.
    Leaf(Rc<dyn Component>),
    /// A container of other modules.
    Composite(BTreeSet<ModuleId>),
}

impl fmt::Debug for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Leaf(c) => write!(f, "Leaf({})", c.class_name()),
            ModuleKind::Composite(subs) => f.debug_tuple("Composite").field(subs).finish(),
        }
    }
}

/// One module instance inside a [`Circuit`](crate::Circuit).
///
/// Every input and output slot is lazily bound to a wire.
#[derive(Debug)]
pub struct Module {
    pub(crate) class_name: String,
    pub(crate) layout: PortLayout,
    pub(crate) kind: ModuleKind,
    pub(crate) inputs: Vec<Option<WireId>>,
    pub(crate) outputs: Vec<Option<WireId>>,
    pub(crate) parent: Option<ModuleId>,
    pub(crate) tag: Option<u32>,
}

impl Module {
    pub(crate) fn new(class_name: String, layout: PortLayout, kind: ModuleKind) -> Self {
        Self {
            inputs: vec![None; layout.num_inputs()],
            outputs: vec![None; layout.num_outputs()],
            class_name,
            layout,
            kind,
            parent: None,
            tag: None,
        }
    }

    /// Structural identity used to share composite delay tables.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Declared ports.
    pub fn layout(&self) -> &PortLayout {
        &self.layout
    }

    /// Leaf behavior or composite children.
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// Returns `true` for composite modules.
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ModuleKind::Composite(_))
    }

    /// The leaf behavior, if this is a leaf.
    pub fn component(&self) -> Option<&dyn Component> {
        match &self.kind {
            ModuleKind::Leaf(c) => Some(c.as_ref()),
            ModuleKind::Composite(_) => None,
        }
    }

    pub(crate) fn component_rc(&self) -> Option<Rc<dyn Component>> {
        match &self.kind {
            ModuleKind::Leaf(c) => Some(Rc::clone(c)),
            ModuleKind::Composite(_) => None,
        }
    }

    /// Direct children of a composite; empty for leaves.
    pub fn submodules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        let subs = match &self.kind {
            ModuleKind::Composite(subs) => Some(subs),
            ModuleKind::Leaf(_) => None,
        };
        subs.into_iter().flatten().copied()
    }

    /// Number of input slots.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output slots.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// The wire bound to input slot `inum`, if any.
    pub fn input_wire(&self, inum: usize) -> Option<WireId> {
        self.slots(Direction::Input)[inum]
    }

    /// The wire bound to output slot `onum`, if any.
    pub fn output_wire(&self, onum: usize) -> Option<WireId> {
        self.slots(Direction::Output)[onum]
    }

    /// The enclosing composite, once registered as a submodule.
    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    /// Optional instance tag shown in labels.
    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    pub(crate) fn slots(&self, direction: Direction) -> &[Option<WireId>] {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    pub(crate) fn slots_mut(&mut self, direction: Direction) -> &mut Vec<Option<WireId>> {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }

    /// All bound wires, inputs first.
    pub(crate) fn bound_wires(&self) -> impl Iterator<Item = WireId> + '_ {
        self.inputs.iter().chain(&self.outputs).flatten().copied()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}#{tag}", self.class_name),
            None => write!(f, "{}", self.class_name),
        }
    }
}
