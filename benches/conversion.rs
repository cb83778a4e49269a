//! Benchmarks for chapter conversion and package rendering.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};

use quire::BookMetadata;
use quire::convert::{ChapterRules, extract_chapter};
use quire::package::{ChapterRecord, render_ncx, render_opf};

/// A chapter page shaped like a typical WordPress serial post.
fn sample_page() -> String {
    let mut body = String::new();
    for i in 0..400 {
        body.push_str(&format!(
            "<p dir=\"ltr\">Paragraph {i}: &ldquo;The Empire stands triumphant,&rdquo; she said, <em>and</em> \
             the <a href=\"/glossary#legion\">legions</a> marched on.<br>Another line.</p>\n"
        ));
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US"><head><meta charset="UTF-8"><title>Chapter 12</title>
<link rel="stylesheet" href="/style.css"><script>var x = 1 < 2;</script></head>
<body><div id="page"><nav><ul><li><a href="/">Home</a></li><li><a href="/toc">TOC</a></li></ul></nav>
<article><h1 class="entry-title">Chapter 12: Unwilling</h1>
<div class="entry-content"><p><a href="/ch11">Previous Chapter</a></p>
{body}<p><a href="/ch13">Next Chapter</a></p></div></article>
<aside><h2>Comments</h2></aside></div></body></html>"#
    )
}

fn bench_extract_chapter(c: &mut Criterion) {
    let html = sample_page();
    let rules = ChapterRules::default();
    let path = Path::new("cache/012.html");

    c.bench_function("extract_chapter", |b| {
        b.iter(|| extract_chapter(black_box(&html), &rules, path).unwrap());
    });

    let chapter = extract_chapter(&html, &rules, path).unwrap();
    c.bench_function("chapter_to_xhtml", |b| {
        b.iter(|| black_box(&chapter).to_xhtml("en"));
    });

    let xhtml = chapter.to_xhtml("en");
    c.bench_function("check_well_formed", |b| {
        b.iter(|| quire::xml::check_well_formed(black_box(&xhtml)).unwrap());
    });
}

fn bench_package_documents(c: &mut Criterion) {
    let metadata = BookMetadata::new("A Practical Guide to Evil", "ErraticErrata", "urn:uuid:1");
    let records: Vec<ChapterRecord> = (1..=500)
        .map(|n| ChapterRecord {
            id: format!("{n:04}.xhtml"),
            title: format!("Chapter {n}: Fish & Chips"),
            href: format!("chapters/{n:04}.xhtml"),
        })
        .collect();

    c.bench_function("render_opf_500", |b| {
        b.iter(|| render_opf(black_box(&records), &metadata));
    });
    c.bench_function("render_ncx_500", |b| {
        b.iter(|| render_ncx(black_box(&records), &metadata));
    });
}

criterion_group!(benches, bench_extract_chapter, bench_package_documents);
criterion_main!(benches);
