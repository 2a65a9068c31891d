use crate::instance::Instance;

///
/// Association
///
/// Seam for the relationship algebra, which lives outside this engine.
/// A definition only stores descriptors and invokes the two injection
/// hooks on every built instance; what the hooks install (accessor
/// behaviors, cached foreign rows, anything) is the association's
/// business.
///

pub trait Association: Send + Sync {
    /// Install the read-side accessor on a freshly built instance.
    fn inject_getter(&self, instance: &mut Instance);

    /// Install the write-side accessor on a freshly built instance.
    fn inject_setter(&self, instance: &mut Instance);
}
