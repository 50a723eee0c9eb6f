use tokio::sync::watch;

/// Observable value published by the controller and read by UI bindings.
///
/// Writes go through [`Property::set`], which only wakes subscribers when the
/// value actually changed.
pub struct Property<T> {
    sender: watch::Sender<T>,
    name: String,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Property<T> {
    pub fn new(initial: T, name: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender,
            name: name.into(),
        }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    pub fn subscribe(&self) -> PropertySubscriber<T> {
        PropertySubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug
    for Property<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &*self.sender.borrow())
            .finish()
    }
}

pub struct PropertySubscriber<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> PropertySubscriber<T> {
    /// Wait for the next change and return the new value.
    /// Returns `None` once the property has been dropped.
    pub async fn wait_for_change(&mut self) -> Option<T> {
        match self.receiver.changed().await {
            Ok(()) => Some(self.receiver.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// Read the current value, marking it as seen.
    pub fn current(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// Whether a change arrived since the last read.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}
