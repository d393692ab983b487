use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::task::{Context, Poll};

/// Handle to a background loading task.
///
/// The task itself runs on whatever runtime spawned it; the handle only
/// watches a channel for the finished result, so it can be polled from
/// a plain event loop with a noop waker or blocked on from a test.
pub struct IoHandle<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T> IoHandle<T> {
    pub fn new(receiver: mpsc::Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Wraps an already-available value, for loaders that resolve
    /// synchronously.
    pub fn ready(value: T) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(value);
        Self { receiver }
    }

    /// Checks for the result without blocking. Consumes the value;
    /// later calls return `None`.
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until the task finishes. Returns `None` if the task was
    /// dropped without delivering a result.
    pub fn recv(self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

impl<T> Future for IoHandle<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<T>> {
        match self.receiver.try_recv() {
            Ok(val) => Poll::Ready(Some(val)),
            Err(mpsc::TryRecvError::Empty) => Poll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::{RawWaker, RawWakerVTable, Waker};

    fn noop_waker() -> Waker {
        fn noop(_: *const ()) {}
        fn clone(p: *const ()) -> RawWaker {
            RawWaker::new(p, &VTABLE)
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) }
    }

    #[test]
    fn ready_value_is_immediately_available() {
        let handle = IoHandle::ready(42u32);
        assert_eq!(handle.try_recv(), Some(42));
    }

    #[test]
    fn try_recv_consumes_the_value() {
        let (tx, rx) = mpsc::channel();
        tx.send(7u32).unwrap();
        let handle = IoHandle::new(rx);
        assert_eq!(handle.try_recv(), Some(7));
        assert_eq!(handle.try_recv(), None);
    }

    #[test]
    fn recv_on_dropped_sender_yields_none() {
        let (tx, rx) = mpsc::channel::<u32>();
        drop(tx);
        let handle = IoHandle::new(rx);
        assert_eq!(handle.recv(), None);
    }

    #[test]
    fn poll_pending_then_ready() {
        let (tx, rx) = mpsc::channel();
        let mut handle = IoHandle::new(rx);
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
        tx.send(99u32).unwrap();
        assert_eq!(Pin::new(&mut handle).poll(&mut cx), Poll::Ready(Some(99)));
    }
}
