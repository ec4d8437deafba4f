//! Integration tests for container detection, document extraction and MD&A.

use std::fs;

use tempfile::tempdir;
use unedgar::mda::MIN_MDA_BYTES;
use unedgar::{
    detect_format_from_path, extract_document, is_submission, parse_mda, Error, MdaMatch,
    MdaOutcome,
};

const SUBMISSION: &str = concat!(
    "\u{FEFF}<SEC-DOCUMENT>\n<SEC-HEADER>\nACCESSION NUMBER:\t\t0000000001-23-000001\n</SEC-HEADER>\n",
    "<DOCUMENT>\n<TYPE>10-K\n<SEQUENCE>1\n<FILENAME>form.htm\n<TEXT>\n<html><body><p>Report</p></body></html>\n</TEXT>\n</DOCUMENT>\n",
    "<DOCUMENT>\n<TYPE>EX-21\n<SEQUENCE>2\n<FILENAME>ex21.htm\n<TEXT>\n<p>Subsidiaries</p>\n</TEXT>\n</DOCUMENT>\n",
    "<DOCUMENT>\n<TYPE>GRAPHIC\n<SEQUENCE>3\n<FILENAME>Logo.JPG\n<TEXT>\nbegin 644 Logo.JPG\n#0V%T\n`\nend\n</TEXT>\n</DOCUMENT>\n",
    "</SEC-DOCUMENT>\n"
);

#[test]
fn test_detect_and_extract_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("submission.txt");
    fs::write(&path, SUBMISSION).unwrap();

    assert!(is_submission(&path));
    let format = detect_format_from_path(&path).unwrap();
    assert_eq!(format.document_count, 3);
    assert!(format.has_sec_header);

    let form = extract_document(&path, "10-K", false).unwrap();
    let form = form.as_text().unwrap();
    assert!(form.starts_with("\n<TYPE>10-K"));
    assert!(form.contains("<p>Report</p>"));

    let exhibit = extract_document(&path, "ex21.htm", false).unwrap();
    assert!(exhibit.as_text().unwrap().contains("Subsidiaries"));
}

#[test]
fn test_extract_binary_attachment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("submission.txt");
    fs::write(&path, SUBMISSION).unwrap();

    // File names match case-insensitively
    let logo = extract_document(&path, "logo.jpg", true).unwrap();
    assert!(logo.is_binary());
    assert_eq!(logo.into_bytes(), b"Cat".to_vec());

    let undecoded = extract_document(&path, "Logo.JPG", false).unwrap();
    assert!(undecoded.as_text().unwrap().contains("begin 644 Logo.JPG"));
}

#[test]
fn test_extract_missing_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("submission.txt");
    fs::write(&path, SUBMISSION).unwrap();

    let result = extract_document(&path, "missing.jpg", true);
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = extract_document(&path, "ex21.htm", true);
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[test]
fn test_not_a_submission() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("page.html");
    fs::write(&path, "<html><body>plain page</body></html>").unwrap();

    assert!(!is_submission(&path));
    assert!(matches!(
        detect_format_from_path(&path),
        Err(Error::UnknownFormat)
    ));
}

/// Section from "Item 7." up to "Item 8." or the end of the text.
fn item_seven(text: &str, start: usize) -> Option<MdaMatch> {
    let begin = start + text[start..].find("Item 7.")?;
    let end = text[begin..]
        .find("Item 8.")
        .map(|offset| begin + offset)
        .unwrap_or(text.len());
    Some(MdaMatch {
        text: text[begin..end].to_string(),
        end,
    })
}

#[test]
fn test_parse_mda_skips_table_of_contents() {
    let dir = tempdir().unwrap();
    let form = dir.path().join("acme.form10k.parsed_1.txt");
    let mda = dir.path().join("acme.mda_1.txt");
    let body = "Liquidity remained strong during the year. ".repeat(40);
    fs::write(
        &form,
        format!(
            "Index\nItem 7. MD&A  31\nItem 8. Statements  52\n\nItem 7. Management's Discussion\n{}\nItem 8. Financial Statements",
            body
        ),
    )
    .unwrap();

    let outcome = parse_mda(&form, &mda, &item_seven, false).unwrap();
    assert_eq!(outcome, MdaOutcome::Written(mda.clone()));

    let written = fs::read_to_string(&mda).unwrap();
    assert!(written.len() >= MIN_MDA_BYTES);
    assert!(written.contains("Liquidity remained strong"));
    assert!(!written.contains("31"));
}
