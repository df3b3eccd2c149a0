use crate::batch::BatchRun;
use crate::extract::PostRecord;

/// Batches with at least this fraction of successes exit cleanly
const SUCCESS_RATIO_THRESHOLD: f64 = 0.5;

/// Prints a single extracted post to stdout
pub fn print_post(record: &PostRecord) {
    println!("\n=== {} ===", record.label);
    println!("URL: {}", record.source_url);
    println!("Author: @{}", record.author_handle);
    println!("Likes: {}", record.like_count);
    match record.published_at {
        Some(at) => println!("Published: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Published: unknown"),
    }
    println!(
        "Media: {} item(s){}",
        record.media_count,
        if record.is_video { ", video" } else { "" }
    );
    if record.caption_text.is_empty() {
        println!("\n(no caption)");
    } else {
        println!("\n{}", record.caption_text);
    }
}

/// Prints the closing tally for a batch run
pub fn print_batch_summary(run: &BatchRun) {
    println!("\n=== Batch Summary ===");
    println!("Processed: {}", run.total());
    println!("Succeeded: {} ✓", run.successes.len());
    println!("Failed: {}", run.failures.len());

    if !run.failures.is_empty() {
        println!("\nFailures:");
        for failure in &run.failures {
            println!("  ✗ {} ({})", failure.source_url, failure.error_description);
        }
    }
}

/// Maps a finished batch to the process exit code
///
/// A run where at least half the inputs succeeded exits 0; anything worse
/// exits 1 so schedulers notice the degradation.
pub fn exit_code_for(run: &BatchRun) -> i32 {
    if run.success_ratio() >= SUCCESS_RATIO_THRESHOLD {
        0
    } else {
        1
    }
}
