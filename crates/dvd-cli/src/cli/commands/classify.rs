//! `dvd classify <url>` – show how an observed URL would be treated.

use dvd_core::quality::quality_of;
use dvd_core::url_model::{classify, is_playback_url, sanitize};

pub fn run_classify(url: &str) {
    let c = classify(url);
    println!("playback:  {}", if is_playback_url(url) { "yes" } else { "no" });
    println!(
        "kind:      {}",
        c.kind.map(|k| k.as_str()).unwrap_or("unknown")
    );
    println!(
        "itag:      {}",
        c.itag.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("quality:   {}", quality_of(c.itag));
    println!("sanitized: {}", sanitize(url));
}
