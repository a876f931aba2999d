use std::collections::VecDeque;
use std::fmt;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

/// Errors raised while wiring up the epoll instance, timers, or signal
/// handlers. All of them wrap an `errno` from the underlying syscall.
#[derive(Debug)]
pub enum Error {
    Epoll(std::io::Error),
    Timer(std::io::Error),
    Signal(nix::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Epoll(e) => write!(f, "epoll setup failed: {e}"),
            Error::Timer(e) => write!(f, "timerfd setup failed: {e}"),
            Error::Signal(e) => write!(f, "sigaction failed: {e}"),
        }
    }
}

impl std::error::Error for Error {}

/// Everything the reactor can hand back from [`Reactor::wait`].
///
/// Each variant corresponds to one fd class the reactor multiplexes: the
/// PTY becoming readable/writable, the windowing collaborator's fd firing,
/// a queued redraw, a key-repeat tick, a cursor blink tick, a child
/// terminating, or an orderly shutdown request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    TtyRead,
    TtyWrite,
    Window,
    Refresh,
    RepeatKey,
    Blink,
    ChildEnd,
    Stop,
}

// Async-signal-safe self-pipe: the handler only sets a bit and bumps an
// eventfd: no allocation, no locking, safe to call from signal context.
static SIGS_PENDING: AtomicU64 = AtomicU64::new(0);
static SIGNAL_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn sig_handler(sig: libc::c_int) {
    SIGS_PENDING.fetch_or(1u64 << (sig as u64), Ordering::Relaxed);
    let fd = SIGNAL_FD.load(Ordering::Relaxed);
    if fd != -1 {
        let one: u64 = 1;
        // Best-effort: if this write fails there is nothing a signal handler
        // can safely do about it.
        unsafe {
            libc::write(fd, std::ptr::from_ref(&one).cast(), 8);
        }
    }
}

fn connect_handler(sig: Signal) -> Result<(), Error> {
    let action = SigAction::new(SigHandler::Handler(sig_handler), SaFlags::empty(), SigSet::all());
    unsafe { sigaction(sig, &action) }.map_err(Error::Signal)?;
    Ok(())
}

fn to_itimerspec(interval: Option<f32>, value: f32) -> libc::itimerspec {
    fn to_timespec(secs: f32) -> libc::timespec {
        let ms = (secs * 1000.0) as i64;
        libc::timespec {
            tv_sec: ms / 1000,
            tv_nsec: (ms % 1000) * 1_000_000,
        }
    }
    libc::itimerspec {
        it_interval: to_timespec(interval.unwrap_or(0.0)),
        it_value: to_timespec(value),
    }
}

fn make_timerfd() -> Result<RawFd, Error> {
    let fd = unsafe { libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_CLOEXEC) };
    if fd == -1 {
        return Err(Error::Timer(std::io::Error::last_os_error()));
    }
    Ok(fd)
}

fn arm_timerfd(fd: RawFd, spec: &libc::itimerspec) -> Result<(), Error> {
    let rc = unsafe {
        libc::timerfd_settime(fd, 0, std::ptr::from_ref(spec), std::ptr::null_mut())
    };
    if rc == -1 {
        return Err(Error::Timer(std::io::Error::last_os_error()));
    }
    Ok(())
}

fn read_u64(fd: RawFd) -> Option<u64> {
    let mut buf: u64 = 0;
    let n = unsafe { libc::read(fd, std::ptr::from_mut(&mut buf).cast(), 8) };
    if n == 8 { Some(buf) } else { None }
}

/// Single-threaded epoll-based multiplexer over the PTY, the windowing
/// collaborator's fd, timers (refresh/repeat/blink), and process signals.
///
/// There is exactly one `Reactor` per process. It owns every fd it
/// registers and closes them on drop.
pub struct Reactor {
    epfd: RawFd,
    sigfd: RawFd,
    refreshfd: Option<RawFd>,
    repeatfd: Option<RawFd>,
    blinkfd: Option<RawFd>,
    ttyfd: Option<RawFd>,
    windowfd: Option<RawFd>,
    queue: VecDeque<Event>,
}

impl Reactor {
    /// Create the epoll instance, the signal self-pipe, and install
    /// handlers for `SIGTERM`, `SIGINT`, `SIGHUP`, and `SIGCHLD`.
    pub fn new() -> Result<Self, Error> {
        let epfd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if epfd == -1 {
            return Err(Error::Epoll(std::io::Error::last_os_error()));
        }

        let sigfd = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) };
        if sigfd == -1 {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(epfd) };
            return Err(Error::Epoll(err));
        }
        SIGNAL_FD.store(sigfd, Ordering::Relaxed);

        let mut reactor = Self {
            epfd,
            sigfd,
            refreshfd: None,
            repeatfd: None,
            blinkfd: None,
            ttyfd: None,
            windowfd: None,
            queue: VecDeque::new(),
        };

        reactor.reg_fd(sigfd, true, false)?;

        connect_handler(Signal::SIGTERM)?;
        connect_handler(Signal::SIGINT)?;
        connect_handler(Signal::SIGHUP)?;
        connect_handler(Signal::SIGCHLD)?;

        Ok(reactor)
    }

    fn reg_fd(&mut self, fd: RawFd, read: bool, write: bool) -> Result<(), Error> {
        let events = u32::from(read) * libc::EPOLLIN as u32
            | u32::from(write) * libc::EPOLLOUT as u32;
        let mut ev = libc::epoll_event { events, u64: fd as u64 };
        let rc = unsafe {
            libc::epoll_ctl(self.epfd, libc::EPOLL_CTL_ADD, fd, std::ptr::from_mut(&mut ev))
        };
        if rc == -1 {
            return Err(Error::Epoll(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Register the PTY master fd for both readability and writability.
    pub fn set_ttyfd(&mut self, ttyfd: RawFd) -> Result<(), Error> {
        self.reg_fd(ttyfd, true, true)?;
        self.ttyfd = Some(ttyfd);
        Ok(())
    }

    /// Register the windowing collaborator's event fd for readability.
    pub fn set_windowfd(&mut self, windowfd: RawFd) -> Result<(), Error> {
        self.reg_fd(windowfd, true, false)?;
        self.windowfd = Some(windowfd);
        Ok(())
    }

    /// Switch an already-registered fd's interest set, e.g. to drop
    /// `EPOLLOUT` once a pending PTY write has fully drained.
    pub fn set_events(&mut self, fd: RawFd, read: bool, write: bool) -> Result<(), Error> {
        let events = u32::from(read) * libc::EPOLLIN as u32
            | u32::from(write) * libc::EPOLLOUT as u32;
        let mut ev = libc::epoll_event { events, u64: fd as u64 };
        let rc = unsafe {
            libc::epoll_ctl(self.epfd, libc::EPOLL_CTL_MOD, fd, std::ptr::from_mut(&mut ev))
        };
        if rc == -1 {
            return Err(Error::Epoll(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Arm a one-shot redraw timer that fires `Event::Refresh` after
    /// `secs` seconds.
    pub fn queue_refresh(&mut self, secs: f32) -> Result<(), Error> {
        if self.refreshfd.is_none() {
            let fd = make_timerfd()?;
            self.reg_fd(fd, true, false)?;
            self.refreshfd = Some(fd);
        }
        arm_timerfd(self.refreshfd.expect("just set"), &to_itimerspec(None, secs))
    }

    /// Start firing `Event::RepeatKey` every `secs` seconds.
    pub fn start_repeat(&mut self, secs: f32) -> Result<(), Error> {
        if self.repeatfd.is_none() {
            let fd = make_timerfd()?;
            self.reg_fd(fd, true, false)?;
            self.repeatfd = Some(fd);
        }
        arm_timerfd(self.repeatfd.expect("just set"), &to_itimerspec(Some(secs), secs))
    }

    /// Stop key-repeat by disarming its timer (the fd stays registered).
    pub fn stop_repeat(&mut self) -> Result<(), Error> {
        let Some(fd) = self.repeatfd else { return Ok(()) };
        arm_timerfd(fd, &to_itimerspec(None, 0.0))
    }

    /// Start firing `Event::Blink` every `secs` seconds.
    pub fn start_blink(&mut self, secs: f32) -> Result<(), Error> {
        if self.blinkfd.is_none() {
            let fd = make_timerfd()?;
            self.reg_fd(fd, true, false)?;
            self.blinkfd = Some(fd);
        }
        arm_timerfd(self.blinkfd.expect("just set"), &to_itimerspec(Some(secs), secs))
    }

    /// Stop cursor blinking by disarming its timer.
    pub fn stop_blink(&mut self) -> Result<(), Error> {
        let Some(fd) = self.blinkfd else { return Ok(()) };
        arm_timerfd(fd, &to_itimerspec(None, 0.0))
    }

    /// Push an event directly onto the front-of-queue, bypassing epoll.
    /// Used to fan out multiple logical events from a single epoll wakeup
    /// (e.g. several coalesced signals, or missed key-repeat ticks).
    pub fn enqueue(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Request an orderly shutdown: the next `wait()` call (after anything
    /// already queued) returns `Event::Stop`.
    pub fn stop(&mut self) {
        self.enqueue(Event::Stop);
    }

    /// Block until the next event is available. Internally-queued events
    /// (from signal coalescing or missed timer ticks) are drained before
    /// polling epoll again.
    pub fn wait(&mut self) -> Event {
        if let Some(evt) = self.queue.pop_front() {
            return evt;
        }

        let mut events: [libc::epoll_event; 4] = [libc::epoll_event { events: 0, u64: 0 }; 4];

        loop {
            let cnt = unsafe {
                libc::epoll_wait(self.epfd, events.as_mut_ptr(), 4, -1)
            };

            if cnt == -1 {
                let err = std::io::Error::last_os_error();
                if err.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                tracing::error!(%err, "epoll_wait failed");
                continue;
            }

            #[allow(clippy::cast_sign_loss)]
            for ev in &events[..cnt as usize] {
                let fd = ev.u64 as RawFd;

                if Some(fd) == self.ttyfd {
                    let readable = ev.events & libc::EPOLLIN as u32 != 0;
                    let writable = ev.events & libc::EPOLLOUT as u32 != 0;
                    if readable && writable {
                        self.enqueue(Event::TtyWrite);
                        return Event::TtyRead;
                    } else if readable {
                        return Event::TtyRead;
                    } else if writable {
                        return Event::TtyWrite;
                    }
                } else if Some(fd) == self.windowfd {
                    return Event::Window;
                } else if fd == self.sigfd {
                    if let Some(first) = self.drain_signals() {
                        return first;
                    }
                } else if Some(fd) == self.refreshfd {
                    read_u64(fd);
                    return Event::Refresh;
                } else if Some(fd) == self.repeatfd {
                    let ticks = read_u64(fd).unwrap_or(1).max(1);
                    for _ in 1..ticks {
                        self.enqueue(Event::RepeatKey);
                    }
                    return Event::RepeatKey;
                } else if Some(fd) == self.blinkfd {
                    read_u64(fd);
                    return Event::Blink;
                } else {
                    tracing::debug!(fd, "epoll woke on an unrecognized fd");
                }
            }
        }
    }

    fn drain_signals(&mut self) -> Option<Event> {
        // Drain the eventfd counter; the actual set of pending signals
        // lives in SIGS_PENDING, swapped out atomically.
        let _ = read_u64(self.sigfd);

        let mask = SIGS_PENDING.swap(0, Ordering::Relaxed);
        if mask == 0 {
            return None;
        }

        let mut first = None;
        let mut remaining = mask;
        while remaining != 0 {
            let bit = remaining & remaining.wrapping_neg();
            let sig = bit.trailing_zeros() as i32;

            let evt = if sig == Signal::SIGCHLD as i32 {
                Event::ChildEnd
            } else if sig == Signal::SIGTERM as i32
                || sig == Signal::SIGINT as i32
                || sig == Signal::SIGHUP as i32
            {
                Event::Stop
            } else {
                tracing::error!(sig, "received an unexpected signal");
                remaining ^= bit;
                continue;
            };

            if first.is_none() {
                first = Some(evt);
            } else {
                self.enqueue(evt);
            }

            remaining ^= bit;
        }

        first
    }
}

impl Drop for Reactor {
    fn drop(&mut self) {
        for fd in [
            Some(self.epfd),
            Some(self.sigfd),
            self.refreshfd,
            self.repeatfd,
            self.blinkfd,
        ]
        .into_iter()
        .flatten()
        {
            unsafe {
                libc::close(fd);
            }
        }
        SIGNAL_FD.store(-1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn queue_drains_before_epoll() {
        let mut reactor = Reactor::new().expect("epoll/eventfd available in test sandbox");
        reactor.enqueue(Event::Refresh);
        reactor.enqueue(Event::Stop);
        assert_eq!(reactor.wait(), Event::Refresh);
        assert_eq!(reactor.wait(), Event::Stop);
    }

    #[test]
    fn repeat_timer_round_trips_through_epoll() {
        let mut reactor = Reactor::new().expect("epoll/eventfd available in test sandbox");
        reactor.start_repeat(0.01).expect("arm repeat timer");
        assert_eq!(reactor.wait(), Event::RepeatKey);
        reactor.stop_repeat().expect("disarm repeat timer");
    }
}
