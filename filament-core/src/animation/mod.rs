//! Animated Transactions
//!
//! Describes how reactive property changes should be animated. The
//! descriptor is toolkit-neutral: applying it is delegated to an installed
//! [`AnimationBackend`], supplied by the widget layer that knows how to open
//! an animated transaction on the native toolkit. Without a backend,
//! mutations apply immediately.
//!
//! [`with_animation`] arranges for the effect re-runs caused by a block of
//! state mutations to see the descriptor; see [`context`] for the timing
//! contract.

mod context;

pub use context::{with_animation, AnimationContext};

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// Easing curve of an animated transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Spring parameters, when the transaction should run on a spring curve
/// instead of a fixed easing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    /// Damping ratio in `0.0..=1.0`; lower values oscillate more.
    pub damping: f64,
    /// Initial velocity as a fraction of the total distance per second.
    pub velocity: f64,
}

/// Describes how a reactive property change should be animated.
///
/// Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub duration: f64,
    pub delay: f64,
    pub easing: Easing,
    pub spring: Option<Spring>,
}

impl Animation {
    fn with(duration: f64, easing: Easing, spring: Option<Spring>) -> Self {
        Self {
            duration,
            delay: 0.0,
            easing,
            spring,
        }
    }

    pub fn ease_in_out(duration: f64) -> Self {
        Self::with(duration, Easing::EaseInOut, None)
    }

    pub fn ease_in(duration: f64) -> Self {
        Self::with(duration, Easing::EaseIn, None)
    }

    pub fn ease_out(duration: f64) -> Self {
        Self::with(duration, Easing::EaseOut, None)
    }

    pub fn linear(duration: f64) -> Self {
        Self::with(duration, Easing::Linear, None)
    }

    pub fn spring(duration: f64, damping: f64, velocity: f64) -> Self {
        Self::with(duration, Easing::Linear, Some(Spring { damping, velocity }))
    }

    /// Delay the start of the transaction.
    pub fn delayed(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Apply `mutations` inside this animation's transaction.
    ///
    /// Dispatches to the installed [`AnimationBackend`]; without one, the
    /// mutations run immediately and unanimated.
    pub fn perform<F: FnOnce()>(&self, mutations: F) {
        // The backend is taken out for the duration of the call so that the
        // mutations it drives can re-enter this module.
        let backend = BACKEND.with(|slot| slot.borrow_mut().take());
        match backend {
            Some(backend) => {
                backend.animate(self, Box::new(mutations));
                BACKEND.with(|slot| {
                    let mut slot = slot.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(backend);
                    }
                });
            }
            None => mutations(),
        }
    }
}

impl Default for Animation {
    /// The standard ease-in-out over 0.3 seconds.
    fn default() -> Self {
        Self::ease_in_out(0.3)
    }
}

/// The toolkit side of an animated transaction.
///
/// The widget layer installs one of these; `animate` must run `mutations`
/// exactly once, inside whatever native animation primitive corresponds to
/// the descriptor.
pub trait AnimationBackend {
    fn animate(&self, animation: &Animation, mutations: Box<dyn FnOnce() + '_>);
}

thread_local! {
    static BACKEND: RefCell<Option<Box<dyn AnimationBackend>>> = RefCell::new(None);
}

/// Install the backend that [`Animation::perform`] dispatches to.
///
/// Replaces any previously installed backend.
pub fn set_animation_backend(backend: impl AnimationBackend + 'static) {
    BACKEND.with(|slot| *slot.borrow_mut() = Some(Box::new(backend)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn default_is_ease_in_out() {
        let animation = Animation::default();
        assert_eq!(animation.duration, 0.3);
        assert_eq!(animation.delay, 0.0);
        assert_eq!(animation.easing, Easing::EaseInOut);
        assert!(animation.spring.is_none());
    }

    #[test]
    fn spring_preset_carries_parameters() {
        let animation = Animation::spring(0.5, 0.7, 0.5);
        let spring = animation.spring.expect("spring parameters");
        assert_eq!(spring.damping, 0.7);
        assert_eq!(spring.velocity, 0.5);
    }

    #[test]
    fn delayed_sets_only_the_delay() {
        let animation = Animation::linear(0.2).delayed(0.1);
        assert_eq!(animation.duration, 0.2);
        assert_eq!(animation.delay, 0.1);
    }

    #[test]
    fn perform_without_backend_applies_immediately() {
        let applied = Rc::new(Cell::new(false));
        let applied_in = applied.clone();

        Animation::default().perform(move || applied_in.set(true));
        assert!(applied.get());
    }

    #[test]
    fn perform_routes_through_the_backend() {
        struct Recording {
            seen: Rc<RefCell<Vec<Animation>>>,
        }

        impl AnimationBackend for Recording {
            fn animate(&self, animation: &Animation, mutations: Box<dyn FnOnce() + '_>) {
                self.seen.borrow_mut().push(animation.clone());
                mutations();
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        set_animation_backend(Recording { seen: seen.clone() });

        let applied = Rc::new(Cell::new(false));
        let applied_in = applied.clone();
        Animation::ease_in(0.25).perform(move || applied_in.set(true));

        assert!(applied.get());
        assert_eq!(*seen.borrow(), vec![Animation::ease_in(0.25)]);

        // The backend survives the call
        Animation::default().perform(|| {});
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn animation_deserializes_from_config() {
        let animation: Animation = serde_json::from_str(
            r#"{"duration":0.4,"delay":0.0,"easing":"EaseOut","spring":null}"#,
        )
        .expect("valid animation config");

        assert_eq!(animation, Animation::ease_out(0.4));
    }
}
