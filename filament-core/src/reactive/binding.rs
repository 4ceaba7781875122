//! Binding Implementation
//!
//! A Binding is a read/write accessor pair over some piece of state. It lets
//! a component hand mutable access to a value across an abstraction boundary
//! without exposing the cell that stores it.
//!
//! A binding projected from a [`Signal`](super::Signal) composes the
//! signal's own accessors: reading through it still registers a dependency,
//! writing through it still notifies and schedules. A binding built from
//! arbitrary closures carries whatever semantics those closures have.

use std::rc::Rc;

/// A pair of closures giving read/write access to a value of type `T`.
///
/// Cloning is cheap and shares the same accessors. A binding has no storage
/// and no identity of its own.
///
/// # Example
///
/// ```rust,ignore
/// let name = Signal::new(String::from("ada"));
/// let binding = name.binding();
///
/// text_field(binding.clone());      // the field reads and writes the name
/// assert_eq!(binding.get(), "ada");
/// ```
pub struct Binding<T> {
    read: Rc<dyn Fn() -> T>,
    write: Rc<dyn Fn(T)>,
}

impl<T> Binding<T> {
    /// Create a binding from a getter and a setter.
    pub fn new(read: impl Fn() -> T + 'static, write: impl Fn(T) + 'static) -> Self {
        Self {
            read: Rc::new(read),
            write: Rc::new(write),
        }
    }

    /// Read the current value through the getter.
    pub fn get(&self) -> T {
        (self.read)()
    }

    /// Write a new value through the setter.
    pub fn set(&self, value: T) {
        (self.write)(value)
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
            write: Rc::clone(&self.write),
        }
    }
}
