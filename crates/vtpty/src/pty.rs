use std::ffi::CString;
use std::fmt;
use std::os::unix::io::RawFd;

use crate::spawn::{current_user, resolve_argv, SpawnConfig};

/// Largest chunk written to the pty in one go, matching how a real tty
/// driver's line discipline buffers writes.
const MAX_WRITE: usize = 255;
/// Size of the fixed non-blocking read buffer.
const READ_BUF: usize = 4096;

#[derive(Debug)]
pub enum Error {
    OpenPty(std::io::Error),
    Fork(std::io::Error),
    Io(std::io::Error),
    NoPasswdEntry,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OpenPty(e) => write!(f, "pty allocation failed: {e}"),
            Error::Fork(e) => write!(f, "fork failed: {e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::NoPasswdEntry => write!(f, "getpwuid() found no entry for the current user"),
        }
    }
}

impl std::error::Error for Error {}

/// One end of a pty, plus the non-blocking write buffer and fixed read
/// buffer a reactor-driven pump needs.
pub struct Pty {
    fd: RawFd,
    child: Option<libc::pid_t>,
    write_buf: Vec<u8>,
    read_buf: [u8; READ_BUF],
    read_len: usize,
}

fn errno() -> std::io::Error {
    std::io::Error::last_os_error()
}

/// Allocate a pty pair via the POSIX `posix_openpt`/`grantpt`/`unlockpt`
/// dance, returning `(master_fd, slave_path)`.
fn allocate() -> Result<(RawFd, CString), Error> {
    unsafe {
        let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
        if master < 0 {
            return Err(Error::OpenPty(errno()));
        }
        if libc::grantpt(master) < 0 || libc::unlockpt(master) < 0 {
            libc::close(master);
            return Err(Error::OpenPty(errno()));
        }

        let mut buf = vec![0u8; 256];
        if libc::ptsname_r(master, buf.as_mut_ptr().cast(), buf.len()) != 0 {
            libc::close(master);
            return Err(Error::OpenPty(errno()));
        }
        let path = CStr_from_buf(&buf);
        Ok((master, path))
    }
}

#[allow(non_snake_case)]
fn CStr_from_buf(buf: &[u8]) -> CString {
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    CString::new(&buf[..len]).unwrap_or_default()
}

impl Pty {
    /// Allocate a pty, fork, and exec the resolved shell in the child.
    /// The parent gets back a `Pty` wired to the master side.
    pub fn spawn(config: &SpawnConfig, cols: u16, rows: u16) -> Result<Self, Error> {
        let passwd = current_user().ok_or(Error::NoPasswdEntry)?;
        let argv = resolve_argv(config, &passwd);

        let (master, slave_path) = allocate()?;
        set_winsize(master, cols, rows);

        // SAFETY: single-threaded at this point in process lifetime; the
        // child either execs or exits without returning past run_child.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            unsafe {
                libc::close(master);
            }
            return Err(Error::Fork(errno()));
        }

        if pid == 0 {
            run_child(master, &slave_path, &argv, config, &passwd);
            std::process::exit(127);
        }

        set_nonblocking(master)?;
        tracing::info!(pid, argv = ?argv, "spawned shell");
        Ok(Self { fd: master, child: Some(pid), write_buf: Vec::new(), read_buf: [0; READ_BUF], read_len: 0 })
    }

    /// Open a direct line device (the `-l`/`--line` option) instead of
    /// forking a shell.
    pub fn open_line(path: &str) -> Result<Self, Error> {
        let cpath = CString::new(path).map_err(|_| Error::OpenPty(errno()))?;
        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDWR) };
        if fd < 0 {
            return Err(Error::OpenPty(errno()));
        }
        set_nonblocking(fd)?;
        Ok(Self { fd, child: None, write_buf: Vec::new(), read_buf: [0; READ_BUF], read_len: 0 })
    }

    #[must_use]
    pub const fn as_raw_fd(&self) -> RawFd {
        self.fd
    }

    #[must_use]
    pub const fn child_pid(&self) -> Option<libc::pid_t> {
        self.child
    }

    /// Whether a previous write was only partially accepted and still
    /// has data queued; the reactor should watch for writability while
    /// this is true.
    #[must_use]
    pub fn has_pending_write(&self) -> bool {
        !self.write_buf.is_empty()
    }

    /// Queue `data` for writing, performing an immediate best-effort
    /// write if nothing is already pending.
    pub fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.write_buf.is_empty() {
            let chunk_len = data.len().min(MAX_WRITE);
            match raw_write(self.fd, &data[..chunk_len]) {
                Ok(n) => {
                    self.write_buf.extend_from_slice(&data[n..]);
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        self.write_buf.extend_from_slice(data);
        Ok(())
    }

    /// Drain as much of the pending write buffer as the fd will accept.
    /// Call when the reactor reports the fd writable.
    pub fn write_ready(&mut self) -> Result<(), Error> {
        while !self.write_buf.is_empty() {
            let chunk_len = self.write_buf.len().min(MAX_WRITE);
            match raw_write(self.fd, &self.write_buf[..chunk_len]) {
                Ok(0) => break,
                Ok(n) => {
                    self.write_buf.drain(..n);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }

    /// Read whatever is available, call `on_bytes` with the newly
    /// accumulated slice (including any carried-over bytes from a
    /// previous call that ended mid-sequence), and keep whatever
    /// `on_bytes` reports as unconsumed for next time.
    ///
    /// Returns `Ok(true)` if the pty hung up (EOF).
    pub fn read_ready<F>(&mut self, mut on_bytes: F) -> Result<bool, Error>
    where
        F: FnMut(&[u8]) -> usize,
    {
        loop {
            if self.read_len == self.read_buf.len() {
                let unconsumed = on_bytes(&self.read_buf[..self.read_len]);
                self.carry_over(unconsumed);
            }

            match raw_read(self.fd, &mut self.read_buf[self.read_len..]) {
                Ok(0) => return Ok(true),
                Ok(n) => {
                    self.read_len += n;
                    let unconsumed = on_bytes(&self.read_buf[..self.read_len]);
                    self.carry_over(unconsumed);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    fn carry_over(&mut self, unconsumed: usize) {
        let start = self.read_len - unconsumed;
        self.read_buf.copy_within(start..self.read_len, 0);
        self.read_len = unconsumed;
    }

    /// Update the pty's window size (`TIOCSWINSZ`).
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), Error> {
        tracing::debug!(cols, rows, "resizing pty");
        set_winsize(self.fd, cols, rows);
        Ok(())
    }

    /// Send `SIGHUP` to the child shell.
    pub fn hup(&self) -> Result<(), Error> {
        if let Some(pid) = self.child {
            tracing::debug!(pid, "sending SIGHUP to child");
            if unsafe { libc::kill(pid, libc::SIGHUP) } < 0 {
                return Err(Error::Io(errno()));
            }
        }
        Ok(())
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

fn raw_write(fd: RawFd, data: &[u8]) -> std::io::Result<usize> {
    let n = unsafe { libc::write(fd, data.as_ptr().cast(), data.len()) };
    if n < 0 {
        Err(errno())
    } else {
        Ok(n as usize)
    }
}

fn raw_read(fd: RawFd, buf: &mut [u8]) -> std::io::Result<usize> {
    let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    if n < 0 {
        Err(errno())
    } else {
        Ok(n as usize)
    }
}

fn set_winsize(fd: RawFd, cols: u16, rows: u16) {
    let winsize = libc::winsize { ws_row: rows, ws_col: cols, ws_xpixel: 0, ws_ypixel: 0 };
    unsafe {
        libc::ioctl(fd, libc::TIOCSWINSZ, std::ptr::addr_of!(winsize));
    }
}

fn set_nonblocking(fd: RawFd) -> Result<(), Error> {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(Error::Io(errno()));
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(Error::Io(errno()));
        }
    }
    Ok(())
}

/// Runs entirely inside the forked child: opens the slave side,
/// establishes the controlling terminal, resets signal dispositions to
/// default, sets up the environment, and execs the resolved shell. Does
/// not return on success.
fn run_child(
    master: RawFd,
    slave_path: &CString,
    argv: &[String],
    config: &SpawnConfig,
    passwd: &crate::spawn::PasswdEntry,
) {
    unsafe {
        libc::close(master);

        if libc::setsid() < 0 {
            std::process::exit(127);
        }

        let slave = libc::open(slave_path.as_ptr(), libc::O_RDWR);
        if slave < 0 {
            std::process::exit(127);
        }

        if libc::ioctl(slave, libc::TIOCSCTTY, 0) < 0 {
            std::process::exit(127);
        }

        libc::dup2(slave, libc::STDIN_FILENO);
        libc::dup2(slave, libc::STDOUT_FILENO);
        libc::dup2(slave, libc::STDERR_FILENO);
        if slave > libc::STDERR_FILENO {
            libc::close(slave);
        }

        for sig in [libc::SIGCHLD, libc::SIGHUP, libc::SIGINT, libc::SIGQUIT, libc::SIGTERM, libc::SIGALRM] {
            libc::signal(sig, libc::SIG_DFL);
        }
    }

    std::env::remove_var("COLUMNS");
    std::env::remove_var("LINES");
    std::env::remove_var("TERMCAP");
    std::env::set_var("LOGNAME", &passwd.name);
    std::env::set_var("USER", &passwd.name);
    std::env::set_var("SHELL", &argv[0]);
    std::env::set_var("HOME", &passwd.dir);
    std::env::set_var("TERM", &config.term_name);

    let Ok(cargv): Result<Vec<CString>, _> = argv.iter().map(|s| CString::new(s.as_str())).collect() else {
        std::process::exit(127);
    };
    let mut argv_ptrs: Vec<*const libc::c_char> = cargv.iter().map(|s| s.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());

    unsafe {
        libc::execvp(cargv[0].as_ptr(), argv_ptrs.as_ptr());
    }
    // only reached if execvp failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pipe_pty() -> (Pty, RawFd) {
        let mut fds = [0i32; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let [read_end, write_end] = fds;
        set_nonblocking(read_end).unwrap();
        let pty = Pty { fd: read_end, child: None, write_buf: Vec::new(), read_buf: [0; READ_BUF], read_len: 0 };
        (pty, write_end)
    }

    #[test]
    fn read_ready_reports_would_block_when_empty() {
        let (mut pty, write_end) = pipe_pty();
        let hup = pty.read_ready(|_| 0).unwrap();
        assert!(!hup);
        unsafe {
            libc::close(write_end);
        }
    }

    #[test]
    fn read_ready_delivers_written_bytes() {
        let (mut pty, write_end) = pipe_pty();
        raw_write(write_end, b"hello").unwrap();
        let mut seen = Vec::new();
        pty.read_ready(|bytes| {
            seen.extend_from_slice(bytes);
            0
        })
        .unwrap();
        assert_eq!(seen, b"hello");
        unsafe {
            libc::close(write_end);
        }
    }

    #[test]
    fn read_ready_carries_over_unconsumed_suffix() {
        let (mut pty, write_end) = pipe_pty();
        raw_write(write_end, b"abc").unwrap();
        pty.read_ready(|bytes| bytes.len()).unwrap(); // claim nothing consumed
        assert_eq!(pty.read_len, 3);
        assert_eq!(&pty.read_buf[..3], b"abc");
        unsafe {
            libc::close(write_end);
        }
    }

    #[test]
    fn eof_is_reported_once_writer_closes() {
        let (mut pty, write_end) = pipe_pty();
        unsafe {
            libc::close(write_end);
        }
        let hup = pty.read_ready(|_| 0).unwrap();
        assert!(hup);
    }
}
