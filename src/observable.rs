use std::fmt;

/// A value that notifies subscribers whenever it is replaced.
pub struct Observable<T> {
    value: T,
    version: u64,
    subscribers: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Observable {
            value,
            version: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Incremented on every `set`, including ones that store an equal value.
    #[cfg(test)]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.version += 1;
        for subscriber in &mut self.subscribers {
            subscriber(&self.value);
        }
    }

    pub fn subscribe<F>(&mut self, f: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribers.push(Box::new(f));
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("version", &self.version)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn set_notifies_and_bumps_version() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut obs = Observable::new(0usize);
        let sink = Rc::clone(&seen);
        obs.subscribe(move |v| sink.borrow_mut().push(*v));

        obs.set(3);
        obs.set(3);
        assert_eq!(*obs.get(), 3);
        assert_eq!(obs.version(), 2);
        assert_eq!(*seen.borrow(), vec![3, 3]);
    }
}
