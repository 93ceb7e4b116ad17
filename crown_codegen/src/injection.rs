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

//!
//! Custom injection: an extra template map (`cfg`) and extra outputs.
//!
//! Both halves can come from YAML:
//!
//! ```yaml
//! injection:
//!   cfg:
//!     abc: "{author}-mp"
//!   file_out:
//!     - template_path: /templates/mapper.xml
//!       output_path: "{output_dir}/xml/{entity}.xml"
//! ```
//!
//! Patterns understand `{author}`, `{output_dir}`, `{entity}` and `{table}`.
//!
use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::ConfigBuilder;
use crate::config::GlobalConfig;
use crate::constant::{DOT_XML, SEPARATOR, TEMPLATE_XML};
use crate::datasource::TableInfo;
use crate::error::{GeneratorError, Result};

/// Computes the `cfg` map from the resolved configuration
pub type InitMapFn = fn(&ConfigBuilder) -> HashMap<String, Value>;

/// Output file of a custom template for one table
pub type OutputFileFn = fn(&GlobalConfig, &TableInfo) -> PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutConfig {
    /// Template path, same form as the [`crate::config::TemplateConfig`] entries
    pub template_path: String,
    /// Output path pattern, used when no `output_file` function is set
    pub output_path: String,
    #[serde(skip)]
    pub output_file: Option<OutputFileFn>,
}

impl FileOutConfig {
    pub fn new(template_path: &str, output_file: OutputFileFn) -> Self {
        Self { template_path: template_path.to_string(), output_path: String::new(), output_file: Some(output_file) }
    }

    pub fn with_pattern(template_path: &str, output_path: &str) -> Self {
        Self { template_path: template_path.to_string(), output_path: output_path.to_string(), output_file: None }
    }

    pub fn output(&self, global: &GlobalConfig, table: &TableInfo) -> Result<PathBuf> {
        if let Some(output_file) = self.output_file {
            return Ok(output_file(global, table));
        }
        if self.output_path.is_empty() {
            return Err(GeneratorError::Config(format!("no output path for template '{}'", self.template_path)));
        }
        Ok(PathBuf::from(interpolate(&self.output_path, global, Some(table))))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Fixed `cfg` entries, string values are interpolated
    cfg: HashMap<String, Value>,
    #[serde(skip)]
    init_map: Option<InitMapFn>,
    #[serde(rename = "file_out")]
    file_out_config_list: Vec<FileOutConfig>,
}

impl InjectionConfig {
    pub fn new(init_map: InitMapFn) -> Self {
        Self { init_map: Some(init_map), ..Default::default() }
    }

    pub fn with_cfg(mut self, key: &str, value: Value) -> Self {
        self.cfg.insert(key.to_string(), value);
        self
    }

    pub fn with_file_out_config(mut self, file_out: FileOutConfig) -> Self {
        self.file_out_config_list.push(file_out);
        self
    }

    pub fn file_out_config_list(&self) -> &[FileOutConfig] {
        &self.file_out_config_list
    }

    /// Fixed entries first, then whatever the init function returns
    pub fn init_map(&self, builder: &ConfigBuilder) -> HashMap<String, Value> {
        let global = builder.global_config();
        let mut map: HashMap<String, Value> = self.cfg.iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => Value::String(interpolate(s, global, None)),
                    other => other.clone(),
                };
                (k.clone(), value)
            })
            .collect();
        if let Some(f) = self.init_map {
            map.extend(f(builder));
        }
        map
    }
}

fn interpolate(pattern: &str, global: &GlobalConfig, table: Option<&TableInfo>) -> String {
    let output_dir = global.output_dir().trim_end_matches(&['/', '\\'][..]);
    let mut out = pattern
        .replace("{author}", global.author())
        .replace("{output_dir}", output_dir);
    if let Some(table) = table {
        out = out.replace("{entity}", table.entity_name()).replace("{table}", table.name());
    }
    out
}

/// `abc` -> `<author>-mp`
pub fn crown_injection_map(builder: &ConfigBuilder) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    map.insert("abc".to_string(), Value::String(format!("{}-mp", builder.global_config().author())));
    map
}

/// `<output_dir>/xml/<EntityName>.xml`
pub fn mapper_xml_output_file(global: &GlobalConfig, table: &TableInfo) -> PathBuf {
    let mut dir = global.output_dir().to_string();
    if !dir.ends_with('/') && !dir.ends_with('\\') {
        dir.push_str(SEPARATOR);
    }
    PathBuf::from(format!("{}xml{}{}{}", dir, SEPARATOR, table.entity_name(), DOT_XML))
}

/// Injection of the crown preset, also used by YAML configs without an `injection` section
pub fn crown_injection() -> InjectionConfig {
    InjectionConfig::new(crown_injection_map)
        .with_file_out_config(FileOutConfig::new(TEMPLATE_XML, mapper_xml_output_file))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mapper_xml_output_file() {
        let mut global = GlobalConfig::default();
        global.set_output_dir("/develop/code/".to_string());
        let mut table = TableInfo::new("sys_user", "");
        table.set_entity_name("User".to_string());
        assert_eq!(mapper_xml_output_file(&global, &table), PathBuf::from("/develop/code/xml/User.xml"));

        global.set_output_dir("/develop/code".to_string());
        assert_eq!(mapper_xml_output_file(&global, &table), PathBuf::from("/develop/code/xml/User.xml"));
    }

    #[test]
    fn test_crown_injection() {
        let injection = crown_injection();
        assert_eq!(injection.file_out_config_list().len(), 1);
        assert_eq!(injection.file_out_config_list()[0].template_path, TEMPLATE_XML);
        assert!(InjectionConfig::default().file_out_config_list().is_empty());
    }

    #[test]
    fn test_file_out_pattern() {
        let mut global = GlobalConfig::default();
        global.set_output_dir("/develop/code/".to_string());
        let mut table = TableInfo::new("sys_user", "");
        table.set_entity_name("User".to_string());

        let file_out = FileOutConfig::with_pattern(TEMPLATE_XML, "{output_dir}/xml/{entity}.xml");
        assert_eq!(file_out.output(&global, &table).unwrap(), PathBuf::from("/develop/code/xml/User.xml"));
        let file_out = FileOutConfig::with_pattern(TEMPLATE_XML, "{output_dir}/raw/{table}.xml");
        assert_eq!(file_out.output(&global, &table).unwrap(), PathBuf::from("/develop/code/raw/sys_user.xml"));

        let empty = FileOutConfig { template_path: TEMPLATE_XML.to_string(), ..Default::default() };
        assert!(matches!(empty.output(&global, &table), Err(GeneratorError::Config(_))));
    }

    #[test]
    fn test_injection_from_yaml() {
        let yaml = r#"
cfg:
  abc: "{author}-mp"
  size: 3
file_out:
  - template_path: /templates/mapper.xml
    output_path: "{output_dir}/xml/{entity}.xml"
"#;
        let injection: InjectionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(injection.file_out_config_list().len(), 1);
        assert_eq!(injection.file_out_config_list()[0].template_path, TEMPLATE_XML);
        assert!(injection.file_out_config_list()[0].output_file.is_none());
        assert_eq!(injection.cfg.get("size"), Some(&Value::from(3)));
    }
}
