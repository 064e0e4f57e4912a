//! Configuration access port.

pub trait ConfigPort {
    /// Raw value of `key` in `section`, `None` when either is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
