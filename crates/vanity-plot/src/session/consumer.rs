use std::io;
use std::process::Child;

/// Handle on the process at the read end of a session's channel.
pub trait Consumer {
    /// Non-blocking reap. `Ok(true)` once the consumer has exited.
    fn try_reap(&mut self) -> io::Result<bool>;

    fn kill(&mut self) -> io::Result<()>;

    /// Blocks until the consumer has exited.
    fn wait(&mut self) -> io::Result<()>;
}

impl Consumer for Child {
    fn try_reap(&mut self) -> io::Result<bool> {
        let status = self.try_wait()?;
        if let Some(status) = status {
            log::debug!("viewer {} exited with {status}", self.id());
        }
        Ok(status.is_some())
    }

    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)
    }

    fn wait(&mut self) -> io::Result<()> {
        let status = Child::wait(self)?;
        log::debug!("viewer {} exited with {status}", self.id());
        Ok(())
    }
}
