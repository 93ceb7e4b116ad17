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

use std::fs;
use std::path::Path;

use crown_codegen::config::{AutoGenerator, Language, NamingStrategy, StrategyConfig};
use crown_codegen::preset::crown_preset;
use crown_codegen::schema::{ColumnMeta, MemorySchemaReader, TableMeta};
use crown_codegen::GeneratorError;

fn schema() -> MemorySchemaReader {
    MemorySchemaReader::new()
        .with_table(TableMeta::new("sys_user", "system user"), vec![
            ColumnMeta::new("id", "bigint(20)").primary(true),
            ColumnMeta::new("login_name", "varchar(32)").with_comment("login name"),
            ColumnMeta::new("status", "tinyint(1)"),
            ColumnMeta::new("create_time", "datetime"),
            ColumnMeta::new("update_time", "datetime"),
        ])
}

fn preset_into(dir: &Path) -> AutoGenerator {
    let mut generator = crown_preset();
    generator.global_mut().set_output_dir(format!("{}/", dir.display()));
    generator
}

#[test]
fn test_crown_preset_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let report = preset_into(tmp.path()).execute_with(&mut schema()).unwrap();

    let base = tmp.path().join("com/baomidou/test");
    let entity = base.join("entity/User.java");
    let mapper = base.join("mapper/UserMapper.java");
    let service = base.join("service/IUserService.java");
    let service_impl = base.join("service/impl/UserServiceImpl.java");
    let controller = base.join("controller/UserController.java");
    let xml = tmp.path().join("xml/User.xml");
    for file in [&entity, &mapper, &service, &service_impl, &controller, &xml] {
        assert!(file.exists(), "missing {}", file.display());
        assert!(report.files().contains(file), "unreported {}", file.display());
    }
    assert_eq!(report.files().len(), 6);
    assert!(!base.join("mapper/xml").exists());

    assert_eq!(report.cfg().get("abc").and_then(|v| v.as_str()), Some("Caratacus-mp"));

    let entity_src = fs::read_to_string(&entity).unwrap();
    assert!(entity_src.contains("package com.baomidou.test.entity;"));
    assert!(entity_src.contains("import org.crown.common.framework.model.BaseModel;"));
    assert!(entity_src.contains("@TableName(\"sys_user\")"));
    assert!(entity_src.contains("public class User extends BaseModel"));
    assert!(entity_src.contains("@TableField(fill = FieldFill.INSERT)"));
    assert!(entity_src.contains("@TableField(fill = FieldFill.INSERT_UPDATE)"));
    assert!(entity_src.contains("private Boolean status;"));
    assert!(entity_src.contains("private LocalDate createTime;"));
    assert!(entity_src.contains("private String loginName;"));
    // id lives in the super entity
    assert!(!entity_src.contains("private Long id;"));

    let mapper_src = fs::read_to_string(&mapper).unwrap();
    assert!(mapper_src.contains("import org.crown.common.framework.mapper.BaseMapper;"));
    assert!(mapper_src.contains("public interface UserMapper extends BaseMapper<User>"));

    let xml_src = fs::read_to_string(&xml).unwrap();
    assert!(xml_src.contains("namespace=\"com.baomidou.test.mapper.UserMapper\""));
    assert!(xml_src.contains("Caratacus-mp"));

    let controller_src = fs::read_to_string(&controller).unwrap();
    assert!(controller_src.contains("@RequestMapping(\"/test/user\")"));
}

#[test]
fn test_existing_files_are_kept() {
    let tmp = tempfile::tempdir().unwrap();
    preset_into(tmp.path()).execute_with(&mut schema()).unwrap();
    let entity = tmp.path().join("com/baomidou/test/entity/User.java");
    fs::write(&entity, "hand edited").unwrap();

    let report = preset_into(tmp.path()).execute_with(&mut schema()).unwrap();
    assert!(report.files().is_empty());
    assert_eq!(fs::read_to_string(&entity).unwrap(), "hand edited");

    let mut generator = preset_into(tmp.path());
    generator.global_mut().set_file_override(true);
    let report = generator.execute_with(&mut schema()).unwrap();
    assert_eq!(report.files().len(), 6);
    assert_ne!(fs::read_to_string(&entity).unwrap(), "hand edited");
}

#[test]
fn test_rust_output() {
    let tmp = tempfile::tempdir().unwrap();
    let mut strategy = StrategyConfig::default();
    strategy.set_naming(NamingStrategy::UnderlineToCamel)
        .set_table_prefix(vec!["sys_".to_string()]);
    let mut generator = AutoGenerator::new()
        .with_lang(Language::Rust)
        .with_strategy(strategy);
    generator.global_mut().set_output_dir(tmp.path().display().to_string());

    let report = generator.execute_with(&mut schema()).unwrap();
    assert_eq!(report.files().len(), 5);
    assert!(report.cfg().is_empty());
    let entity = tmp.path().join("com/baomidou/entity/user.rs");
    let src = fs::read_to_string(&entity).unwrap();
    assert!(src.contains("pub struct User {"));
    assert!(src.contains("use chrono::NaiveDate;"));
    assert!(src.contains("pub status: Option<bool>,"));
    assert!(tmp.path().join("com/baomidou/service/user_service.rs").exists());
}

#[test]
fn test_missing_table_columns_fail() {
    struct Broken;
    impl crown_codegen::schema::SchemaReader for Broken {
        fn tables(&mut self) -> crown_codegen::Result<Vec<TableMeta>> {
            Ok(vec![TableMeta::new("sys_user", "")])
        }
        fn columns(&mut self, table: &str) -> crown_codegen::Result<Vec<ColumnMeta>> {
            Err(GeneratorError::Database(format!("Table '{}' is locked", table)))
        }
    }
    let tmp = tempfile::tempdir().unwrap();
    let result = preset_into(tmp.path()).execute_with(&mut Broken);
    assert!(matches!(result, Err(GeneratorError::Database(_))));
}

fn load_yaml(dir: &Path, extra: &str) -> AutoGenerator {
    let yaml = format!(r#"
global:
  output_dir: "{}/"
  author: Caratacus
package:
  parent: com.baomidou
  module_name: test
strategy:
  naming: UnderlineToCamel
  table_prefix: [sys_]
template:
  xml: ~
{}"#, dir.display(), extra);
    let path = dir.join("generator.yml");
    fs::write(&path, yaml).unwrap();
    AutoGenerator::load(&path.display().to_string()).unwrap()
}

#[test]
fn test_yaml_without_injection_uses_crown_injection() {
    let tmp = tempfile::tempdir().unwrap();
    let report = load_yaml(tmp.path(), "").execute_with(&mut schema()).unwrap();

    assert_eq!(report.cfg().get("abc").and_then(|v| v.as_str()), Some("Caratacus-mp"));
    let xml = tmp.path().join("xml/User.xml");
    assert!(xml.exists());
    assert!(report.files().contains(&xml));
    assert!(!tmp.path().join("com/baomidou/test/mapper/xml").exists());
}

#[test]
fn test_yaml_injection_section() {
    let tmp = tempfile::tempdir().unwrap();
    let injection = r#"injection:
  cfg:
    abc: "{author}-custom"
  file_out:
    - template_path: /templates/mapper.xml
      output_path: "{output_dir}/mappers/{table}.xml"
"#;
    let report = load_yaml(tmp.path(), injection).execute_with(&mut schema()).unwrap();

    assert_eq!(report.cfg().get("abc").and_then(|v| v.as_str()), Some("Caratacus-custom"));
    let xml = tmp.path().join("mappers/sys_user.xml");
    assert!(xml.exists());
    assert!(fs::read_to_string(&xml).unwrap().contains("Caratacus-custom"));
    assert!(!tmp.path().join("xml/User.xml").exists());
}
