use legallens_session::{Notice, Notifier};

/// Prints session notices for the person at the terminal.
pub(crate) struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice.message());
    }
}
