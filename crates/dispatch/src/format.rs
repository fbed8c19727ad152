use common::SignalEvent;

/// Render an inbound signal payload as chat display text.
///
/// Total over any payload: missing fields fall back to `""` for the
/// signal and `"?"` for instrument and timeframe. The optional
/// `expiration` and `message` fields append extra lines when present.
pub fn format_signal(event: &SignalEvent) -> String {
    let signal = event.signal.as_deref().unwrap_or("").to_uppercase();
    let symbol = event.symbol.as_deref().unwrap_or("?");
    let timeframe = event.timeframe.as_deref().unwrap_or("?");

    let mut text = format!(
        "\u{1F514} Signal: *{signal}*\nInstrument: `{symbol}`\nTimeframe: `{timeframe}`"
    );
    if let Some(expiration) = event.expiration.as_deref() {
        text.push_str(&format!("\nExpiration: `{expiration}`"));
    }
    if let Some(message) = event.message.as_deref() {
        if !message.is_empty() {
            text.push_str("\n\n");
            text.push_str(message);
        }
    }
    text
}
