pub(crate) mod feedback;
pub(crate) mod persona;
pub(crate) mod visitors;
