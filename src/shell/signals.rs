use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

extern "C" fn on_interrupt(_: libc::c_int) {}

/// 让 Ctrl-C / Ctrl-\ 只终止正在运行的命令，而不是 shell 本身。
///
/// A handler rather than `SIG_IGN`: exec resets handled signals to their
/// default action, so programs started by the shell stay interruptible.
pub fn ignore_interrupts() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGQUIT] {
        // SAFETY: the handler does nothing, so it is async-signal-safe.
        unsafe { sigaction(signal, &action) }?;
    }
    debug!("已安装中断信号处理");
    Ok(())
}

/// Puts SIGPIPE back to its default action. The Rust runtime ignores it,
/// and an ignored disposition survives exec.
pub fn restore_sigpipe() -> nix::Result<()> {
    let action = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    // SAFETY: installs no handler.
    unsafe { sigaction(Signal::SIGPIPE, &action) }?;
    Ok(())
}
