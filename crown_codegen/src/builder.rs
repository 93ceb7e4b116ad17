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


use std::collections::{BTreeSet, HashMap};
use getset::{Getters, Setters};
use regex::Regex;
use crate::config::{DataSourceConfig, GlobalConfig, Language, NamingStrategy, PackageConfig, StrategyConfig, TemplateConfig};
use crate::constant::{CONTROLLER, CONTROLLER_PATH, DOT, ENTITY, ENTITY_PATH, MAPPER, MAPPER_PATH, MODULE_NAME, PLACE_HOLDER, SEPARATOR, SERVICE, SERVICE_IMPL, SERVICE_IMPL_PATH, SERVICE_PATH, SUPER_MAPPER_CLASS, SUPER_SERVICE_CLASS, SUPER_SERVICE_IMPL_CLASS, TMPDIR, XML, XML_PATH};
use crate::convert::{CrownTypeConvert, ITypeConvert};
use crate::datasource::{IDbQuery, MySqlKeyWordsHandler, TableField, TableInfo};
use crate::error::Result;
use crate::schema::{ColumnMeta, SchemaReader, TableMeta};

const ANNOTATION_PACKAGE: &str = "com.baomidou.mybatisplus.annotation";

/// Resolved configuration plus the table list of one run
#[derive(Clone, Debug, Getters, Setters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
pub struct ConfigBuilder {
    lang: Language,
    data_source_config: DataSourceConfig,
    package_config: PackageConfig,
    strategy_config: StrategyConfig,
    template_config: TemplateConfig,
    global_config: GlobalConfig,
    table_info_list: Vec<TableInfo>,
    /// Output directory per artifact, keyed like `entity_path`
    path_info: HashMap<String, String>,
    /// Fully qualified package per artifact
    package_info: HashMap<String, String>,
    super_entity_class: String,
    super_mapper_class: String,
    super_service_class: String,
    super_service_impl_class: String,
    super_controller_class: String,
    type_convert: CrownTypeConvert,
}


impl ConfigBuilder {

    pub fn new(lang: Language, package_config: PackageConfig, data_source_config: DataSourceConfig, strategy_config: StrategyConfig,
               template_config: TemplateConfig, global_config: GlobalConfig, reader: &mut dyn SchemaReader) -> Result<Self> {
        let type_convert = data_source_config.type_convert();
        let mut cb = Self {
            lang,
            data_source_config,
            strategy_config,
            package_config,
            template_config,
            global_config,
            table_info_list: vec![],
            package_info: HashMap::new(),
            path_info: HashMap::new(),
            super_entity_class: "".to_string(),
            super_controller_class: "".to_string(),
            super_mapper_class: "".to_string(),
            super_service_impl_class: "".to_string(),
            super_service_class: "".to_string(),
            type_convert,
        };
        cb.process_types();
        cb.handler_package();
        cb.table_info_list = cb.tables_info(reader)?;
        Ok(cb)
    }

    pub fn process_types(&mut self) {
        self.super_service_class = self.strategy_config.super_service_class().clone().unwrap_or_else(|| SUPER_SERVICE_CLASS.to_string());
        self.super_service_impl_class = self.strategy_config.super_service_impl_class().clone().unwrap_or_else(|| SUPER_SERVICE_IMPL_CLASS.to_string());
        self.super_mapper_class = self.strategy_config.super_mapper_class().clone().unwrap_or_else(|| SUPER_MAPPER_CLASS.to_string());
        self.super_entity_class = self.strategy_config.super_entity_class().clone().unwrap_or_default();
        self.super_controller_class = self.strategy_config.super_controller_class().clone().unwrap_or_default();
    }

    pub fn handler_package(&mut self) {
        let parent = self.package_config.parent_package();
        self.package_info.insert(MODULE_NAME.to_string(), self.package_config.module_name().to_string());
        self.package_info.insert(ENTITY.to_string(), Self::join_package(&parent, self.package_config.entity()));
        self.package_info.insert(MAPPER.to_string(), Self::join_package(&parent, self.package_config.mapper()));
        self.package_info.insert(XML.to_string(), Self::join_package(&parent, self.package_config.xml()));
        self.package_info.insert(SERVICE.to_string(), Self::join_package(&parent, self.package_config.service()));
        self.package_info.insert(SERVICE_IMPL.to_string(), Self::join_package(&parent, self.package_config.service_impl()));
        self.package_info.insert(CONTROLLER.to_string(), Self::join_package(&parent, self.package_config.controller()));

        // explicit paths replace the derived ones
        self.path_info = self.package_config.path_info().clone();
        if self.path_info.is_empty() {
            let template = self.template_config.clone();
            self.set_path(template.entity(), ENTITY_PATH, ENTITY);
            self.set_path(template.mapper(), MAPPER_PATH, MAPPER);
            self.set_path(template.xml(), XML_PATH, XML);
            self.set_path(template.service(), SERVICE_PATH, SERVICE);
            self.set_path(template.service_impl(), SERVICE_IMPL_PATH, SERVICE_IMPL);
            self.set_path(template.controller(), CONTROLLER_PATH, CONTROLLER);
        }
    }

    fn join_package(parent: &str, sub_package: &str) -> String {
        if parent.is_empty() {
            return sub_package.to_string();
        }
        format!("{}{}{}", parent, DOT, sub_package)
    }

    pub fn join_path(parent_dir: &str, package_name: &str) -> String {
        let mut parent_dir = if parent_dir.is_empty() { TMPDIR.to_string() } else { parent_dir.to_string() };
        if !parent_dir.ends_with('\\') && !parent_dir.ends_with('/') {
            parent_dir += SEPARATOR;
        }
        format!("{}{}", parent_dir, package_name.replace(DOT, SEPARATOR))
    }

    fn set_path(&mut self, template: &Option<String>, path: &str, module: &str) {
        if template.as_deref().map(|t| !t.is_empty()).unwrap_or(false) {
            let package = self.package_info.get(module).cloned().unwrap_or_default();
            self.path_info.insert(path.to_string(), Self::join_path(self.global_config.output_dir(), &package));
        }
    }

    /// Strip prefixes and apply the naming strategy to a table or column name
    fn process_name(name: &str, strategy: NamingStrategy, prefix: &[String]) -> String {
        let remove_prefix = prefix.iter().any(|p| !p.is_empty());
        match (remove_prefix, strategy) {
            (true, NamingStrategy::UnderlineToCamel) => NamingStrategy::remove_prefix_and_camel(name, prefix),
            (true, NamingStrategy::NoChange) => NamingStrategy::remove_prefix(name, prefix),
            (false, NamingStrategy::UnderlineToCamel) => NamingStrategy::underline_to_camel(name),
            (false, NamingStrategy::NoChange) => name.to_string(),
        }
    }

    fn process_name_with_naming(&self, name: &str) -> String {
        if self.strategy_config.is_capital_mode_naming(name) {
            return name.to_string();
        }
        Self::process_name(name, self.strategy_config.column_naming_strategy(), self.strategy_config.field_prefix())
    }

    /// Case insensitive equality, or the configured name read as a regex matching the whole table name
    pub fn table_name_matches(set_table_name: &str, db_table_name: &str) -> bool {
        if set_table_name.eq_ignore_ascii_case(db_table_name) {
            return true;
        }
        Regex::new(&format!("^(?:{})$", set_table_name))
            .map(|re| re.is_match(db_table_name))
            .unwrap_or(false)
    }

    fn is_plain_name(name: &str) -> bool {
        name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn tables_info(&self, reader: &mut dyn SchemaReader) -> Result<Vec<TableInfo>> {
        let include = self.strategy_config.include();
        let exclude = self.strategy_config.exclude();

        let mut tables: Vec<TableMeta> = Vec::new();
        for table in reader.tables()? {
            if table.name.is_empty() {
                continue;
            }
            if *self.strategy_config.skip_view() && table.is_view {
                tracing::debug!("skip view {}", table.name);
                continue;
            }
            tables.push(table);
        }
        if tables.is_empty() {
            eprintln!("The current database has no tables!");
        }

        // configured plain names the database does not know
        let not_exist: BTreeSet<&String> = include.iter().chain(exclude.iter())
            .filter(|n| Self::is_plain_name(n))
            .filter(|n| !tables.iter().any(|t| t.name.eq_ignore_ascii_case(n)))
            .collect();
        if !not_exist.is_empty() {
            eprintln!("Tables {:?} do not exist in the database!", not_exist);
        }

        let selected: Vec<TableMeta> = if !include.is_empty() {
            tables.into_iter().filter(|t| include.iter().any(|i| Self::table_name_matches(i, &t.name))).collect()
        } else if !exclude.is_empty() {
            tables.into_iter().filter(|t| !exclude.iter().any(|e| Self::table_name_matches(e, &t.name))).collect()
        } else {
            tables
        };

        let mut table_list = Vec::with_capacity(selected.len());
        for table in selected.iter() {
            let columns = reader.columns(&table.name)?;
            let mut table_info = self.convert_table_fields(TableInfo::new(&table.name, &table.comment), &columns);
            self.process_table(&mut table_info);
            self.process_imports(&mut table_info);
            table_list.push(table_info);
        }
        Ok(table_list)
    }

    /// Attach the columns to a table
    pub fn convert_table_fields(&self, mut table_info: TableInfo, columns: &[ColumnMeta]) -> TableInfo {
        let mut have_id = false;
        let mut field_list: Vec<TableField> = Vec::new();
        let mut common_field_list: Vec<TableField> = Vec::new();
        let db_query = self.data_source_config.db_query();
        for column in columns {
            let mut field = TableField::new(&column.name, &column.column_type);
            // only the first primary key column is the id
            if column.is_primary() && !have_id {
                field.set_key_flag(true);
                field.set_key_identity_flag(db_query.is_key_identity(&column.extra));
                have_id = true;
            }
            if MySqlKeyWordsHandler::is_key_words(&column.name) {
                eprintln!("Table [{}] has column [{}] which is a database keyword!", table_info.name(), &column.name);
                field.set_key_words(true);
                field.set_column_name(MySqlKeyWordsHandler::format_column(&column.name));
            }
            let property_name = self.process_name_with_naming(&column.name);
            field.set_property_name_with_strategy(&self.strategy_config, property_name);
            field.set_column_type(self.type_convert.process_type_convert(&self.lang, &column.column_type));
            if *self.strategy_config.entity_boolean_column_remove_is_prefix() && field.column_type().is_boolean() {
                let stripped = crate::util::remove_is_prefix_if_boolean(field.property_name());
                if stripped != *field.property_name() {
                    let mut chars = stripped.chars();
                    let lowered: String = chars.next().map(|c| c.to_lowercase().chain(chars).collect()).unwrap_or_default();
                    field.set_property_name(lowered);
                    field.set_convert(true);
                }
            }
            field.set_comment(column.comment.to_string());
            field.set_capital_name_info();
            if let Some(fill) = self.strategy_config.fill_for(field.name(), field.property_name()) {
                field.set_fill(Some(fill.name().to_string()));
            }
            if self.strategy_config.include_super_entity_column(&column.name) {
                common_field_list.push(field);
            } else {
                field_list.push(field);
            }
        }
        table_info.set_fields(field_list);
        table_info.set_common_fields(common_field_list);
        table_info.set_field_names_info();
        table_info
    }

    fn name_or_default(template: &str, default: String, entity_name: &str) -> String {
        let template = if template.is_empty() { default } else { template.to_string() };
        template.replace(PLACE_HOLDER, entity_name)
    }

    /// Derive the type names of one table
    pub fn process_table(&self, table_info: &mut TableInfo) {
        let entity_name = NamingStrategy::capital_first(&Self::process_name(table_info.name(), *self.strategy_config.naming(), self.strategy_config.table_prefix()));
        let global = &self.global_config;

        if !global.entity_name().is_empty() {
            table_info.set_convert(true);
            table_info.set_entity_name(global.entity_name().replace(PLACE_HOLDER, &entity_name));
        } else {
            table_info.set_entity_name(entity_name.to_string());
            let convert = self.strategy_config.starts_with_table_prefix(table_info.name())
                || *self.strategy_config.entity_table_field_annotation_enable()
                || !entity_name.eq_ignore_ascii_case(table_info.name());
            table_info.set_convert(convert);
        }

        table_info.set_mapper_name(Self::name_or_default(global.mapper_name(), format!("{}{}", PLACE_HOLDER, MAPPER), &entity_name));
        table_info.set_xml_name(Self::name_or_default(global.xml_name(), format!("{}{}", PLACE_HOLDER, MAPPER), &entity_name));
        table_info.set_service_name(Self::name_or_default(global.service_name(), format!("{}{}{}", self.lang.service_prefix(), PLACE_HOLDER, SERVICE), &entity_name));
        table_info.set_service_impl_name(Self::name_or_default(global.service_impl_name(), format!("{}{}", PLACE_HOLDER, SERVICE_IMPL), &entity_name));
        table_info.set_controller_name(Self::name_or_default(global.controller_name(), format!("{}{}", PLACE_HOLDER, CONTROLLER), &entity_name));
        table_info.set_entity_path_info();
    }

    /// Imports the entity template needs
    pub fn process_imports(&self, table_info: &mut TableInfo) {
        let java = self.lang == Language::Java;
        if java {
            if !self.super_entity_class.is_empty() {
                let class = self.super_entity_class.clone();
                table_info.add_import(&class);
            } else if *self.global_config.active_record() {
                table_info.add_import("com.baomidou.mybatisplus.extension.activerecord.Model");
            } else {
                table_info.add_import("java.io.Serializable");
            }
            if *table_info.convert() {
                table_info.add_import(&format!("{}.TableName", ANNOTATION_PACKAGE));
            }
        }
        let mut imports: Vec<String> = Vec::new();
        for field in table_info.fields() {
            if let Some(pkg) = field.column_type().package() {
                imports.push(pkg.to_string());
            }
            if !java {
                continue;
            }
            if *field.key_flag() {
                if *field.key_identity_flag() {
                    imports.push(format!("{}.IdType", ANNOTATION_PACKAGE));
                }
                imports.push(format!("{}.TableId", ANNOTATION_PACKAGE));
            } else if *field.convert() {
                imports.push(format!("{}.TableField", ANNOTATION_PACKAGE));
            }
            if field.fill().is_some() {
                imports.push(format!("{}.TableField", ANNOTATION_PACKAGE));
                imports.push(format!("{}.FieldFill", ANNOTATION_PACKAGE));
            }
        }
        for pkg in imports {
            table_info.add_import(&pkg);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{FieldFill, TableFill};
    use crate::convert::{DbColumnType, JavaColumnType};
    use crate::schema::MemorySchemaReader;

    fn strategy() -> StrategyConfig {
        let mut strategy = StrategyConfig::default();
        strategy.set_naming(NamingStrategy::UnderlineToCamel);
        strategy.set_table_prefix(vec!["sys_".to_string()]);
        strategy.set_super_entity_columns(vec!["id".to_string()]);
        strategy.set_table_fill_list(vec![
            TableFill::new("createTime", FieldFill::Insert),
            TableFill::new("updateTime", FieldFill::InsertUpdate),
        ]);
        strategy
    }

    fn reader() -> MemorySchemaReader {
        MemorySchemaReader::new()
            .with_table(TableMeta::new("sys_user_role", "user roles"), vec![
                ColumnMeta::new("id", "bigint(20)").primary(true),
                ColumnMeta::new("role_id", "int(11)").primary(false),
                ColumnMeta::new("order", "varchar(16)"),
                ColumnMeta::new("create_time", "datetime"),
                ColumnMeta::new("update_time", "datetime"),
                ColumnMeta::new("is_enabled", "tinyint(1)"),
            ])
            .with_table(TableMeta::new("sys_menu", ""), vec![ColumnMeta::new("id", "bigint(20)").primary(true)])
            .with_table(TableMeta::view("v_user"), vec![])
    }

    fn builder(strategy: StrategyConfig) -> ConfigBuilder {
        let mut global = GlobalConfig::default();
        global.set_output_dir("/develop/code/".to_string());
        ConfigBuilder::new(Language::Java, PackageConfig::default(), DataSourceConfig::default(), strategy,
                           TemplateConfig::default(), global, &mut reader()).unwrap()
    }

    #[test]
    fn test_table_name_matches() {
        assert!(ConfigBuilder::table_name_matches("SYS_USER", "sys_user"));
        assert!(!ConfigBuilder::table_name_matches("sys_user_role", "sys_user"));
        assert!(!ConfigBuilder::table_name_matches("sys_user", "sys_user_role"));
        assert!(ConfigBuilder::table_name_matches("sys_.*", "sys_user_role"));
        assert!(!ConfigBuilder::table_name_matches("(", "sys_user"));
    }

    #[test]
    fn test_table_names_and_fields() {
        let cb = builder(strategy());
        let tables = cb.table_info_list();
        assert_eq!(tables.len(), 3);
        let user_role = &tables[0];
        assert_eq!(user_role.entity_name(), "UserRole");
        assert_eq!(user_role.mapper_name(), "UserRoleMapper");
        assert_eq!(user_role.service_name(), "IUserRoleService");
        assert_eq!(user_role.entity_path(), "userRole");
        assert!(*user_role.convert());

        // super entity column moved out
        assert_eq!(user_role.common_fields().len(), 1);
        assert!(*user_role.common_fields()[0].key_flag());
        assert!(user_role.fields().iter().all(|f| !*f.key_flag()));

        let order = &user_role.fields()[1];
        assert!(*order.key_words());
        assert_eq!(order.column_name(), "`order`");

        let create_time = &user_role.fields()[2];
        assert_eq!(create_time.property_name(), "createTime");
        assert_eq!(create_time.fill().as_deref(), Some("INSERT"));
        assert_eq!(create_time.column_type(), &DbColumnType::Java(JavaColumnType::LocalDate));
        assert_eq!(user_role.fields()[3].fill().as_deref(), Some("INSERT_UPDATE"));
        assert!(user_role.import_packages().contains("java.time.LocalDate"));
        assert!(user_role.import_packages().contains("com.baomidou.mybatisplus.annotation.FieldFill"));
    }

    #[test]
    fn test_include_and_skip_view() {
        let mut s = strategy();
        s.set_include(vec!["sys_menu".to_string()]);
        assert_eq!(builder(s).table_info_list().len(), 1);

        let mut s = strategy();
        s.set_exclude(vec!["sys_m.*".to_string()]);
        s.set_skip_view(true);
        let cb = builder(s);
        assert_eq!(cb.table_info_list().len(), 1);
        assert_eq!(cb.table_info_list()[0].name(), "sys_user_role");
    }

    #[test]
    fn test_paths() {
        let mut package = PackageConfig::default();
        package.set_module_name("test".to_string());
        let mut global = GlobalConfig::default();
        global.set_output_dir("/develop/code".to_string());
        let mut template = TemplateConfig::default();
        template.set_xml(None);
        let cb = ConfigBuilder::new(Language::Java, package, DataSourceConfig::default(), strategy(),
                                    template, global, &mut MemorySchemaReader::new()).unwrap();
        assert_eq!(cb.package_info().get(ENTITY).map(String::as_str), Some("com.baomidou.test.entity"));
        assert_eq!(cb.path_info().get(ENTITY_PATH).map(String::as_str), Some("/develop/code/com/baomidou/test/entity"));
        assert!(cb.path_info().get(XML_PATH).is_none());
        assert_eq!(ConfigBuilder::join_path("", "a.b"), "./temp/a/b");
    }
}
