use std::path::PathBuf;

use clap::Parser;
use kestrel::{Arguments, run};

fn write_tables(dir: &tempfile::TempDir) -> Vec<PathBuf> {
    let counters = dir.path().join("counters.csv");
    std::fs::write(
        &counters,
        "machine:string,name:string,value:real\nvm0,cpu,50\nvm0,mem,30\nvm1,cpu,20\n",
    )
    .unwrap();
    let ids = dir.path().join("ids.csv");
    std::fs::write(&ids, "id:long\n1\n\n2\n").unwrap();
    vec![counters, ids]
}

fn dump(extra: &[&str], files: &[PathBuf]) -> String {
    let mut argv = vec!["kestrel".to_string()];
    argv.extend(files.iter().map(|p| p.display().to_string()));
    argv.extend(extra.iter().map(|s| s.to_string()));
    let args = Arguments::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    run(&args, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn dump_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_tables(&dir);

    let expected = "\
machine:string; name:string; value:real
------------------
vm0; cpu; 50
vm0; mem; 30
vm1; cpu; 20

id:long
------------------
1
2
";
    assert_eq!(expected, dump(&[], &files));
}

#[test]
fn dump_take() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_tables(&dir);

    let expected = "\
machine:string; name:string; value:real
------------------
vm0; cpu; 50
";
    assert_eq!(expected, dump(&["--take", "1", "--batch-size", "1"], &files[..1]));
}

#[test]
fn dump_count() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_tables(&dir);

    let expected = "\
Count:long
------------------
3

Count:long
------------------
2
";
    assert_eq!(expected, dump(&["--count"], &files));
}

#[test]
fn bad_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "v:long\nnope\n").unwrap();

    let args = Arguments::try_parse_from(["kestrel".to_string(), bad.display().to_string()]).unwrap();
    let err = run(&args, &mut Vec::new()).unwrap_err();
    assert_eq!(Some("2"), err.field("line"));
}

#[test]
fn list_functions() {
    let out = dump(&["--list-functions"], &[]);
    let lines: Vec<_> = out.lines().collect();

    assert!(
        lines.contains(&"strcat(values...)\tscalar\tstring\tConcatenate the text form of all arguments."),
        "{out}"
    );
    assert!(lines.iter().any(|l| l.starts_with("iff(") && l.ends_with("(aliases: iif)")), "{out}");
    assert!(lines.iter().any(|l| l.starts_with("row_cumsum(") && l.contains("\twindow\t")));
    assert!(lines.contains(&"\tstrcat('a', 1, true) => a1True"), "{out}");
}
