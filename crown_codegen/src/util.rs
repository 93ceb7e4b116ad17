/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */

use regex::Regex;
use once_cell::sync::Lazy;

/// Upper case letters, digits and underscores only, e.g. `USER_NAME`
static CAPITAL_MODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[0-9A-Z_]+$").expect("static regex")
});

static IS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^is([A-Z])").expect("static regex")
});

pub fn is_uppercase_naming(s: &str) -> bool {
    s.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
}

///
/// Whether the word follows capital mode naming
///
pub fn is_capital_mode(word: &str) -> bool {
    !word.is_empty() && CAPITAL_MODE.is_match(word)
}

/// `isDeleted` -> `Deleted`, anything else unchanged
pub fn remove_is_prefix_if_boolean(name: &str) -> String {
    IS_PREFIX.replace(name, "$1").to_string()
}

pub fn contains_upper_case(word: &str) -> bool {
    word.chars().any(char::is_uppercase)
}

/// `User_Name`: starts upper case, underscores only between alphanumerics.
pub fn is_camel_case_with_underscores(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    match chars.first() {
        Some(c) if c.is_uppercase() => {}
        _ => return false,
    }
    if !s.contains('_') {
        return false;
    }
    for (i, c) in chars.iter().enumerate().skip(1) {
        if *c == '_' {
            let prev_ok = chars[i - 1].is_alphanumeric();
            let next_ok = chars.get(i + 1).map(|n| n.is_alphanumeric()).unwrap_or(false);
            if !prev_ok || !next_ok {
                return false;
            }
        } else if !c.is_alphanumeric() {
            return false;
        }
    }
    true
}

/// Last segment of a dotted class name, `None` for blank input.
pub fn simple_class_name(class_path: &str) -> Option<String> {
    if class_path.is_empty() {
        return None;
    }
    Some(class_path.rsplit('.').next().unwrap_or(class_path).to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_capital_mode() {
        assert!(is_capital_mode("USER_NAME"));
        assert!(!is_capital_mode("user_name"));
        assert!(!is_capital_mode(""));
    }

    #[test]
    fn test_remove_is_prefix() {
        assert_eq!(remove_is_prefix_if_boolean("isDeleted"), "Deleted");
        assert_eq!(remove_is_prefix_if_boolean("island"), "island");
    }

    #[test]
    fn test_camel_case_with_underscores() {
        assert!(is_camel_case_with_underscores("User_Name"));
        assert!(!is_camel_case_with_underscores("user_name"));
        assert!(!is_camel_case_with_underscores("User__Name"));
        assert!(!is_camel_case_with_underscores("UserName"));
    }

    #[test]
    fn test_simple_class_name() {
        assert_eq!(simple_class_name("org.crown.common.framework.mapper.BaseMapper").as_deref(), Some("BaseMapper"));
        assert_eq!(simple_class_name("BaseMapper").as_deref(), Some("BaseMapper"));
        assert_eq!(simple_class_name(""), None);
    }
}
