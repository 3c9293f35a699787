use crate::types::FeedResult;

/// Print aggregated feed results to stdout: each subscription's name, its
/// entry count, and every entry title. The full current feed is reported on
/// every run.
pub fn report(results: &[FeedResult]) {
    for result in results {
        println!(
            "Feed {} {} items",
            result.subscription_name,
            result.entries.len()
        );
        for entry in &result.entries {
            println!("{}", entry.title);
        }
    }
}
