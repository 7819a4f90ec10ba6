use webman::http::decode::{query_param, url_decode, url_decode_bytes};

fn form_encode(bytes: &[u8]) -> String {
    url::form_urlencoded::byte_serialize(bytes).collect()
}

#[test]
fn test_url_decode_inverts_form_encoding() {
    let samples: [&str; 6] = [
        "/data/plain.txt",
        "/data/with space & ampersand=equals",
        "/mnt/usb0/Ünïcødé файл 文件.bin",
        "100% legit?#fragment",
        "+plus+signs+",
        "",
    ];

    for s in samples {
        assert_eq!(url_decode(&form_encode(s.as_bytes())), s, "sample {:?}", s);
    }
}

#[test]
fn test_url_decode_bytes_inverts_arbitrary_bytes() {
    let bytes: Vec<u8> = (0..=255u8).collect();
    assert_eq!(url_decode_bytes(form_encode(&bytes).as_bytes()), bytes);
}

#[test]
fn test_url_decode_hex_is_case_insensitive() {
    assert_eq!(url_decode("%2f%2F%e4%b8%ad"), "//中");
}

#[test]
fn test_url_decode_plus_is_space() {
    assert_eq!(url_decode("a+b"), "a b");
}

#[test]
fn test_url_decode_malformed_escapes_pass_through() {
    assert_eq!(url_decode("%"), "%");
    assert_eq!(url_decode("%4"), "%4");
    assert_eq!(url_decode("%zz"), "%zz");
    assert_eq!(url_decode("%4g"), "%4g");
    assert_eq!(url_decode("50%off"), "50%off");
}

#[test]
fn test_url_decode_never_grows() {
    for s in ["%", "%%%", "abc%2", "%41%42%4", "+%+"] {
        assert!(url_decode_bytes(s.as_bytes()).len() <= s.len());
    }
}

#[test]
fn test_query_param_basic() {
    let q = "old=%2Fa&new=%2Fb";
    assert_eq!(query_param(q, "old"), Some("%2Fa"));
    assert_eq!(query_param(q, "new"), Some("%2Fb"));
    assert_eq!(query_param(q, "path"), None);
}

#[test]
fn test_query_param_exact_key() {
    let q = "subpath=%2Fwrong&path=%2Fright";
    assert_eq!(query_param(q, "path"), Some("%2Fright"));
    assert_eq!(query_param("pathx=1", "path"), None);
}

#[test]
fn test_query_param_first_occurrence_wins() {
    assert_eq!(query_param("path=a&path=b", "path"), Some("a"));
}

#[test]
fn test_query_param_tolerates_leading_question_mark() {
    assert_eq!(query_param("?path=%2Fdata", "path"), Some("%2Fdata"));
}

#[test]
fn test_query_param_stops_at_space() {
    assert_eq!(query_param("path=a b&c=d", "path"), Some("a"));
}

#[test]
fn test_query_param_empty_value() {
    assert_eq!(query_param("path=&x=1", "path"), Some(""));
}

#[test]
fn test_query_param_key_without_value_is_absent() {
    assert_eq!(query_param("path&x=1", "path"), None);
}
