use proptest::prelude::*;

use common::SignalEvent;
use dispatch::format_signal;

proptest! {
    /// The formatter is total: any combination of present/absent fields,
    /// including arbitrary unicode content, must render without panicking
    /// and keep the fixed template lines.
    #[test]
    fn format_never_panics_and_keeps_template(
        signal in proptest::option::of(".{0,40}"),
        symbol in proptest::option::of(".{0,40}"),
        timeframe in proptest::option::of(".{0,20}"),
        message in proptest::option::of(".{0,200}"),
        expiration in proptest::option::of(".{0,20}"),
    ) {
        let event = SignalEvent { signal, symbol, timeframe, message, expiration };
        let text = format_signal(&event);

        prop_assert!(text.starts_with("\u{1F514} Signal: *"));
        prop_assert!(text.contains("Instrument: `"));
        prop_assert!(text.contains("Timeframe: `"));
    }

    /// Absent instrument and timeframe always render as the `?` placeholder.
    #[test]
    fn missing_fields_render_placeholders(signal in proptest::option::of(".{0,40}")) {
        let event = SignalEvent { signal, ..SignalEvent::default() };
        let text = format_signal(&event);

        prop_assert!(text.contains("Instrument: `?`"));
        prop_assert!(text.contains("Timeframe: `?`"));
    }
}
