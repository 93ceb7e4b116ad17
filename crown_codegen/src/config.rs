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
use std::collections::HashMap;
use std::fs;
use getset::{Getters, MutGetters, Setters};
use serde::{Deserialize, Serialize};
use crate::builder::ConfigBuilder;
use crate::constant::{DOT, TEMPLATE_CONTROLLER, TEMPLATE_CONTROLLER_RS, TEMPLATE_ENTITY_JAVA, TEMPLATE_ENTITY_RS, TEMPLATE_MAPPER, TEMPLATE_MAPPER_RS, TEMPLATE_SERVICE, TEMPLATE_SERVICE_IMPL, TEMPLATE_SERVICE_IMPL_RS, TEMPLATE_SERVICE_RS, TEMPLATE_XML, UNDERLINE};
use crate::convert::{crown_type_rules, CrownTypeConvert, TypeRule};
use crate::datasource::{DbType, MySqlQuery};
use crate::engine::{GenerationReport, TemplateEngine};
use crate::error::Result;
use crate::injection::{crown_injection, InjectionConfig};
use crate::schema::{MySqlSchemaReader, SchemaReader};
use crate::util::{is_camel_case_with_underscores, is_capital_mode, is_uppercase_naming};

/// Code generator entry: one configuration bundle, one run.
#[derive(Debug, Clone, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct AutoGenerator {
    lang: Language,
    global: GlobalConfig,
    package: PackageConfig,
    strategy: StrategyConfig,
    datasource: DataSourceConfig,
    /// `None` picks the defaults of `lang`
    template: Option<TemplateConfig>,
    /// Missing in YAML means the crown injection
    #[serde(default = "crown_injection")]
    injection: InjectionConfig,
}

impl Default for AutoGenerator {
    fn default() -> Self {
        Self {
            lang: Language::Java,
            global: GlobalConfig::default(),
            package: PackageConfig::default(),
            strategy: StrategyConfig::default(),
            datasource: DataSourceConfig::default(),
            template: None,
            injection: InjectionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Java,
    Rust,
}

impl Language {
    pub fn suffix(&self) -> &'static str {
        match self {
            Language::Java => ".java",
            Language::Rust => ".rs",
        }
    }

    /// File stem for a generated type name
    pub fn file_name(&self, name: &str) -> String {
        match self {
            Language::Rust => NamingStrategy::camel_to_underline(name),
            Language::Java => name.to_string(),
        }
    }

    pub fn service_prefix(&self) -> &'static str {
        match self {
            Language::Rust => "",
            Language::Java => "I",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct StrategyConfig {
    /// Upper case column names are kept as is
    capital_mode: bool,
    /// Table name to entity name
    naming: NamingStrategy,
    /// Column name to property name, falls back to `naming`
    column_naming: Option<NamingStrategy>,
    entity_boolean_column_remove_is_prefix: bool,
    rest_controller_style: bool,
    entity_table_field_annotation_enable: bool,
    table_prefix: Vec<String>,
    field_prefix: Vec<String>,
    /// Tables to generate, exact name (case insensitive) or regex
    include: Vec<String>,
    exclude: Vec<String>,
    skip_view: bool,
    table_fill_list: Vec<TableFill>,
    super_entity_class: Option<String>,
    /// Columns inherited from the super entity
    super_entity_columns: Vec<String>,
    super_mapper_class: Option<String>,
    super_service_class: Option<String>,
    super_service_impl_class: Option<String>,
    super_controller_class: Option<String>,
}

impl StrategyConfig {

    pub fn is_capital_mode_naming(&self, word: &str) -> bool {
        self.capital_mode && is_capital_mode(word)
    }

    pub fn column_naming_strategy(&self) -> NamingStrategy {
        self.column_naming.unwrap_or(self.naming)
    }

    pub fn include_super_entity_column(&self, column: &str) -> bool {
        self.super_entity_columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn starts_with_table_prefix(&self, table_name: &str) -> bool {
        self.table_prefix.iter().any(|p| !p.is_empty() && table_name.starts_with(p.as_str()))
    }

    /// Fill of the first rule naming this column or property
    pub fn fill_for(&self, column_name: &str, property_name: &str) -> Option<&FieldFill> {
        self.table_fill_list.iter()
            .find(|tf| tf.field_name.eq_ignore_ascii_case(column_name) || tf.field_name.eq_ignore_ascii_case(property_name))
            .map(|tf| &tf.field_fill)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            capital_mode: false,
            naming: NamingStrategy::NoChange,
            column_naming: None,
            entity_boolean_column_remove_is_prefix: false,
            rest_controller_style: false,
            entity_table_field_annotation_enable: false,
            table_prefix: vec![],
            field_prefix: vec![],
            include: vec![],
            exclude: vec![],
            skip_view: false,
            table_fill_list: vec![],
            super_entity_class: None,
            super_entity_columns: vec![],
            super_mapper_class: None,
            super_service_class: None,
            super_service_impl_class: None,
            super_controller_class: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct TableFill {
    field_name: String,
    field_fill: FieldFill,
}

impl TableFill {
    pub fn new(field_name: &str, field_fill: FieldFill) -> Self {
        Self { field_name: field_name.to_string(), field_fill }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldFill {
    Default,
    Insert,
    Update,
    InsertUpdate,
}

impl FieldFill {
    /// Constant name used by the generated annotations
    pub fn name(&self) -> &'static str {
        match self {
            FieldFill::Default => "DEFAULT",
            FieldFill::Insert => "INSERT",
            FieldFill::Update => "UPDATE",
            FieldFill::InsertUpdate => "INSERT_UPDATE",
        }
    }
}

/// Datasource. Values are passed through to the driver untouched.
#[derive(Debug, Clone, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct DataSourceConfig {
    driver_name: String,
    username: String,
    password: String,
    url: String,
    db_type: DbType,
    /// Column type rules, checked in order before the stock conversion
    type_rules: Vec<TypeRule>,
}

impl DataSourceConfig {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    pub fn db_query(&self) -> MySqlQuery {
        match self.db_type {
            DbType::Mysql | DbType::Mariadb => MySqlQuery,
        }
    }

    pub fn type_convert(&self) -> CrownTypeConvert {
        CrownTypeConvert::new(self.type_rules.clone())
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            driver_name: "".to_string(),
            username: "".to_string(),
            password: "".to_string(),
            url: "".to_string(),
            db_type: DbType::Mysql,
            type_rules: crown_type_rules(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub enum NamingStrategy {
    UnderlineToCamel,
    NoChange,
}

impl NamingStrategy {

    /// Strip the first matching prefix, then underline to camel
    pub fn remove_prefix_and_camel(name: &str, prefixes: &[String]) -> String {
        Self::underline_to_camel(&Self::remove_prefix(name, prefixes))
    }

    pub fn remove_prefix(name: &str, prefixes: &[String]) -> String {
        prefixes.iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| name.strip_prefix(p.as_str()))
            .unwrap_or(name)
            .to_string()
    }

    pub fn capital_first(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn underline_to_camel(name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }
        let mut temp_name = name.to_string();
        if is_uppercase_naming(name) || is_camel_case_with_underscores(name) {
            temp_name = name.to_lowercase();
        }
        let mut result = String::new();
        // leading, trailing and doubled underscores produce empty pieces
        for piece in temp_name.split(UNDERLINE).filter(|v| !v.is_empty()) {
            if result.is_empty() {
                result.push_str(piece);
            } else {
                result.push_str(&Self::capital_first(piece));
            }
        }
        result
    }

    pub fn camel_to_underline(name: &str) -> String {
        let mut result = String::new();
        for (i, c) in name.chars().enumerate() {
            if c.is_uppercase() {
                if i != 0 {
                    result.push('_');
                }
                result.extend(c.to_lowercase());
            } else {
                result.push(c);
            }
        }
        result
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct GlobalConfig {
    output_dir: String,
    /// Directory holding `*.tmpl` overrides of the built-in templates
    template_dir: Option<String>,
    /// Overwrite files that already exist
    file_override: bool,
    active_record: bool,
    /// Mapper XML second level cache
    enable_cache: bool,
    base_result_map: bool,
    base_column_list: bool,
    author: String,
    /// Naming templates, `%s` is the entity name, e.g. `%sAction` -> `UserAction`
    entity_name: String,
    mapper_name: String,
    xml_name: String,
    service_name: String,
    service_impl_name: String,
    controller_name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_dir: "".to_string(),
            template_dir: None,
            file_override: false,
            active_record: false,
            enable_cache: false,
            base_result_map: false,
            base_column_list: false,
            author: "".to_string(),
            entity_name: "".to_string(),
            mapper_name: "".to_string(),
            xml_name: "".to_string(),
            service_name: "".to_string(),
            service_impl_name: "".to_string(),
            controller_name: "".to_string(),
        }
    }
}

/// Template per artifact, `None` disables that artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct TemplateConfig {
    entity: Option<String>,
    service: Option<String>,
    service_impl: Option<String>,
    mapper: Option<String>,
    xml: Option<String>,
    controller: Option<String>,
}

impl TemplateConfig {
    pub fn for_language(lang: &Language) -> Self {
        match lang {
            Language::Java => Self::default(),
            Language::Rust => Self {
                entity: Some(TEMPLATE_ENTITY_RS.to_string()),
                service: Some(TEMPLATE_SERVICE_RS.to_string()),
                service_impl: Some(TEMPLATE_SERVICE_IMPL_RS.to_string()),
                mapper: Some(TEMPLATE_MAPPER_RS.to_string()),
                xml: None,
                controller: Some(TEMPLATE_CONTROLLER_RS.to_string()),
            },
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            entity: Some(TEMPLATE_ENTITY_JAVA.to_string()),
            service: Some(TEMPLATE_SERVICE.to_string()),
            service_impl: Some(TEMPLATE_SERVICE_IMPL.to_string()),
            mapper: Some(TEMPLATE_MAPPER.to_string()),
            xml: Some(TEMPLATE_XML.to_string()),
            controller: Some(TEMPLATE_CONTROLLER.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(default)]
pub struct PackageConfig {
    /// Parent package. Sub packages are joined onto `parent.module_name`.
    parent: String,
    module_name: String,
    entity: String,
    service: String,
    service_impl: String,
    mapper: String,
    xml: String,
    controller: String,
    /// Explicit output directories keyed like `entity_path`; replaces the derived ones
    path_info: HashMap<String, String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            parent: "com.baomidou".to_string(),
            module_name: "".to_string(),
            entity: "entity".to_string(),
            service: "service".to_string(),
            service_impl: "service.impl".to_string(),
            mapper: "mapper".to_string(),
            xml: "mapper.xml".to_string(),
            controller: "controller".to_string(),
            path_info: HashMap::new(),
        }
    }
}

impl PackageConfig {
    /// `parent.module_name`, or `parent` without a module
    pub fn parent_package(&self) -> String {
        if !self.module_name.is_empty() {
            return format!("{}{}{}", &self.parent, DOT, self.module_name);
        }
        self.parent.to_string()
    }
}

impl AutoGenerator {

    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML configuration file
    pub fn load(config_path: &str) -> Result<Self> {
        let content = fs::read_to_string(config_path).map_err(|e| crate::error::GeneratorError::io(config_path, e))?;
        let cfg = serde_yaml::from_str::<AutoGenerator>(&content)?;
        tracing::info!("Configuration loaded from '{}'", config_path);
        Ok(cfg)
    }

    pub fn with_lang(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_datasource(mut self, datasource: DataSourceConfig) -> Self {
        self.datasource = datasource;
        self
    }

    pub fn with_global(mut self, cfg: GlobalConfig) -> Self {
        self.global = cfg;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_package(mut self, package: PackageConfig) -> Self {
        self.package = package;
        self
    }

    pub fn with_template(mut self, template: TemplateConfig) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_injection(mut self, injection: InjectionConfig) -> Self {
        self.injection = injection;
        self
    }

    /// Connect to the configured database and generate.
    pub fn execute(self) -> Result<GenerationReport> {
        let mut reader = MySqlSchemaReader::connect(&self.datasource)?;
        self.execute_with(&mut reader)
    }

    /// Generate from an already opened schema source.
    pub fn execute_with(self, reader: &mut dyn SchemaReader) -> Result<GenerationReport> {
        let template = self.template.unwrap_or_else(|| TemplateConfig::for_language(&self.lang));
        let builder = ConfigBuilder::new(self.lang, self.package, self.datasource, self.strategy, template, self.global, reader)?;
        let engine = TemplateEngine::init(builder, self.injection)?;
        engine.mkdirs()?;
        let files = engine.batch_output()?;
        eprintln!("========================== generation finished ==========================");
        Ok(GenerationReport::new(files, engine.cfg_map().clone()))
    }
}
