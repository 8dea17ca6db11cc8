//! Shared fixtures: EPUB archives built in memory

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 17 words of plain prose
pub const SENTENCE: &str =
    "The river ran quietly past the old mill while the village slept under a pale autumn moon.";

pub const SENTENCE_WORDS: usize = 17;

/// XHTML chapter with a two-word heading followed by `sentences` paragraphs
pub fn chapter_xhtml(heading: &str, sentences: usize) -> String {
    let paragraphs: String = (0..sentences)
        .map(|_| format!("    <p>{}</p>\n", SENTENCE))
        .collect();
    xhtml(&format!("    <h1>{}</h1>\n{}", heading, paragraphs))
}

/// Wrap body markup in an XHTML document with an embedded stylesheet
pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head>
    <title>Chapter</title>
    <style>p {{ margin: 0; text-indent: 1em; }}</style>
  </head>
  <body>
{}  </body>
</html>
"#,
        body
    )
}

/// Build an EPUB whose spine lists `entries` in order as `(id, xhtml)` pairs
///
/// Each entry is stored at `OEBPS/Text/{id}.xhtml`.
pub fn build_epub(entries: &[(&str, String)]) -> Vec<u8> {
    build_epub_in("OEBPS", entries)
}

/// Same as [`build_epub`] with the package file under `package_dir`
pub fn build_epub_in(package_dir: &str, entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();

    writer.start_file("META-INF/container.xml", deflated).unwrap();
    writer.write_all(container_xml(package_dir).as_bytes()).unwrap();

    writer
        .start_file(format!("{}/content.opf", package_dir), deflated)
        .unwrap();
    writer.write_all(content_opf(entries).as_bytes()).unwrap();

    writer
        .start_file(format!("{}/toc.ncx", package_dir), deflated)
        .unwrap();
    writer.write_all(toc_ncx(entries).as_bytes()).unwrap();

    for (id, markup) in entries {
        writer
            .start_file(format!("{}/Text/{}.xhtml", package_dir, id), deflated)
            .unwrap();
        writer.write_all(markup.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

fn container_xml(package_dir: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{package_dir}/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#
    )
}

fn content_opf(entries: &[(&str, String)]) -> String {
    let manifest: String = entries
        .iter()
        .map(|(id, _)| {
            format!(
                "    <item id=\"{id}\" href=\"Text/{id}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
            )
        })
        .collect();
    let spine: String = entries
        .iter()
        .map(|(id, _)| format!("    <itemref idref=\"{id}\"/>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Fixture Book</dc:title>
    <dc:creator>Test Author</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="bookid">urn:uuid:00000000-0000-0000-0000-000000000001</dc:identifier>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#
    )
}

fn toc_ncx(entries: &[(&str, String)]) -> String {
    let points: String = entries
        .iter()
        .enumerate()
        .map(|(i, (id, _))| {
            format!(
                "    <navPoint id=\"np{n}\" playOrder=\"{n}\">\n      <navLabel><text>{id}</text></navLabel>\n      <content src=\"Text/{id}.xhtml\"/>\n    </navPoint>\n",
                n = i + 1
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:00000000-0000-0000-0000-000000000001"/>
  </head>
  <docTitle><text>Fixture Book</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#
    )
}

/// A small, realistic book: a noise entry, two readable chapters and
/// entries the filter drops
pub fn sample_epub() -> Vec<u8> {
    build_epub(&sample_entries())
}

pub fn sample_entries() -> Vec<(&'static str, String)> {
    vec![
        ("toc", chapter_xhtml("Table Contents", 20)),
        ("chapter01", chapter_xhtml("Chapter One", 4)),
        ("dedication", xhtml("    <p>For my mother.</p>\n")),
        ("chapter02", chapter_xhtml("Chapter Two", 6)),
    ]
}

/// Tokens produced by [`sample_epub`]
pub const SAMPLE_TOKENS: usize = (2 + 4 * SENTENCE_WORDS) + (2 + 6 * SENTENCE_WORDS);
