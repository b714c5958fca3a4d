use super::ActivitySignal;

/// Trait for components that react to activity signals.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &ActivitySignal);

    fn handle_signals(&mut self, signals: &[ActivitySignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}
