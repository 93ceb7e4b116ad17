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
//! The crown project generator settings.
//!
use crate::config::{AutoGenerator, DataSourceConfig, FieldFill, GlobalConfig, Language, NamingStrategy, PackageConfig, StrategyConfig, TableFill, TemplateConfig};
use crate::convert::crown_type_rules;
use crate::datasource::DbType;
use crate::injection::crown_injection;

pub const CROWN_OUTPUT_DIR: &str = "/develop/code/";

pub fn crown_global_config() -> GlobalConfig {
    let mut global = GlobalConfig::default();
    global.set_output_dir(CROWN_OUTPUT_DIR.to_string())
        .set_file_override(false)
        .set_active_record(false)
        .set_enable_cache(false)
        .set_base_result_map(false)
        .set_base_column_list(false)
        .set_author("Caratacus".to_string())
        .set_entity_name("%s".to_string())
        .set_mapper_name("%sMapper".to_string())
        .set_xml_name("%sMapper".to_string())
        .set_service_name("I%sService".to_string())
        .set_service_impl_name("%sServiceImpl".to_string())
        .set_controller_name("%sController".to_string());
    global
}

pub fn crown_datasource_config() -> DataSourceConfig {
    let mut datasource = DataSourceConfig::new("jdbc:mysql://127.0.0.1:3306/crown?characterEncoding=utf8", "root", "521");
    datasource.set_db_type(DbType::Mysql)
        .set_driver_name("com.mysql.cj.jdbc.Driver".to_string())
        .set_type_rules(crown_type_rules());
    datasource
}

pub fn crown_strategy_config() -> StrategyConfig {
    let mut strategy = StrategyConfig::default();
    strategy.set_capital_mode(false)
        .set_table_prefix(vec!["sys_".to_string()])
        .set_naming(NamingStrategy::UnderlineToCamel)
        .set_super_entity_class(Some("org.crown.common.framework.model.BaseModel".to_string()))
        .set_super_entity_columns(vec!["id".to_string()])
        .set_table_fill_list(vec![
            TableFill::new("createTime", FieldFill::Insert),
            TableFill::new("updateTime", FieldFill::InsertUpdate),
        ])
        .set_super_mapper_class(Some("org.crown.common.framework.mapper.BaseMapper".to_string()));
    strategy
}

pub fn crown_package_config() -> PackageConfig {
    let mut package = PackageConfig::default();
    package.set_module_name("test".to_string())
        .set_parent("com.baomidou".to_string())
        .set_controller("controller".to_string());
    package
}

/// Default templates minus the mapper XML, which the injected file output writes instead
pub fn crown_template_config() -> TemplateConfig {
    let mut template = TemplateConfig::default();
    template.set_xml(None);
    template
}

pub fn crown_preset() -> AutoGenerator {
    AutoGenerator::new()
        .with_lang(Language::Java)
        .with_global(crown_global_config())
        .with_datasource(crown_datasource_config())
        .with_strategy(crown_strategy_config())
        .with_package(crown_package_config())
        .with_injection(crown_injection())
        .with_template(crown_template_config())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_crown_preset() {
        let preset = crown_preset();
        assert_eq!(preset.global().author(), "Caratacus");
        assert_eq!(preset.global().service_name(), "I%sService");
        assert!(!*preset.global().file_override());
        assert_eq!(preset.datasource().username(), "root");
        assert_eq!(preset.datasource().type_rules().len(), 5);
        assert_eq!(preset.strategy().table_prefix(), &vec!["sys_".to_string()]);
        assert_eq!(preset.package().parent_package(), "com.baomidou.test");
        assert_eq!(preset.template().as_ref().and_then(|t| t.xml().clone()), None);
        assert_eq!(preset.injection().file_out_config_list().len(), 1);
    }
}
