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
use std::path::{Path, PathBuf};
use chrono::Local;
use getset::Getters;
use serde_json::Value;
use tera::{Context, Tera};
use crate::builder::ConfigBuilder;
use crate::constant::{CONTROLLER_PATH, DOT_XML, ENTITY_PATH, MAPPER_PATH, SEPARATOR, SERVICE_IMPL_PATH, SERVICE_PATH, TEMPLATE_SUFFIX, XML_PATH};
use crate::datasource::TableInfo;
use crate::error::{GeneratorError, Result};
use crate::injection::InjectionConfig;
use crate::util::simple_class_name;

/// Built-in templates, used for any name the template directory does not provide
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("entity.java.tmpl", include_str!("../templates/entity.java.tmpl")),
    ("mapper.java.tmpl", include_str!("../templates/mapper.java.tmpl")),
    ("mapper.xml.tmpl", include_str!("../templates/mapper.xml.tmpl")),
    ("service.java.tmpl", include_str!("../templates/service.java.tmpl")),
    ("serviceImpl.java.tmpl", include_str!("../templates/serviceImpl.java.tmpl")),
    ("controller.java.tmpl", include_str!("../templates/controller.java.tmpl")),
    ("entity.rs.tmpl", include_str!("../templates/entity.rs.tmpl")),
    ("mapper.rs.tmpl", include_str!("../templates/mapper.rs.tmpl")),
    ("service.rs.tmpl", include_str!("../templates/service.rs.tmpl")),
    ("serviceImpl.rs.tmpl", include_str!("../templates/serviceImpl.rs.tmpl")),
    ("controller.rs.tmpl", include_str!("../templates/controller.rs.tmpl")),
];

/// Files written by one run plus the injected `cfg` map
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct GenerationReport {
    files: Vec<PathBuf>,
    cfg: HashMap<String, Value>,
}

impl GenerationReport {
    pub fn new(files: Vec<PathBuf>, cfg: HashMap<String, Value>) -> Self {
        Self { files, cfg }
    }
}

/// Template engine
#[derive(Getters)]
#[getset(get = "pub")]
pub struct TemplateEngine {
    tera: Tera,
    builder: ConfigBuilder,
    injection: InjectionConfig,
    cfg_map: HashMap<String, Value>,
}

impl TemplateEngine {

    pub fn init(builder: ConfigBuilder, injection: InjectionConfig) -> Result<Self> {
        let mut tera = match builder.global_config().template_dir() {
            Some(dir) if !dir.is_empty() => {
                let glob = format!("{}{}**{}*{}", dir.trim_end_matches(['/', '\\']), SEPARATOR, SEPARATOR, TEMPLATE_SUFFIX);
                Tera::new(&glob)?
            }
            _ => Tera::default(),
        };
        let existing: Vec<String> = tera.get_template_names().map(Self::template_file_name).collect();
        let missing: Vec<(&str, &str)> = DEFAULT_TEMPLATES.iter()
            .filter(|(name, _)| !existing.iter().any(|e| e == name))
            .copied()
            .collect();
        tera.add_raw_templates(missing)?;
        // generated source, never HTML
        tera.autoescape_on(vec![]);
        let cfg_map = injection.init_map(&builder);
        Ok(Self {
            tera,
            builder,
            injection,
            cfg_map,
        })
    }

    /// Create every package output directory
    pub fn mkdirs(&self) -> Result<()> {
        for (key, dir) in self.builder.path_info().iter() {
            let path = Path::new(dir);
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| GeneratorError::io(path, e))?;
                tracing::debug!("created {} directory {}", key, dir);
            }
        }
        Ok(())
    }

    /// Render every enabled template for every table
    pub fn batch_output(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        let lang = self.builder.lang();
        let path_info = self.builder.path_info();
        let template = self.builder.template_config();
        for table_info in self.builder.table_info_list().iter() {
            let context = self.context(table_info);
            let artifacts = [
                (template.entity(), ENTITY_PATH, table_info.entity_name(), lang.suffix()),
                (template.mapper(), MAPPER_PATH, table_info.mapper_name(), lang.suffix()),
                (template.xml(), XML_PATH, table_info.xml_name(), DOT_XML),
                (template.service(), SERVICE_PATH, table_info.service_name(), lang.suffix()),
                (template.service_impl(), SERVICE_IMPL_PATH, table_info.service_impl_name(), lang.suffix()),
                (template.controller(), CONTROLLER_PATH, table_info.controller_name(), lang.suffix()),
            ];
            for (template_path, path_key, name, suffix) in artifacts {
                let template_path = match template_path {
                    Some(t) if !t.is_empty() => t,
                    _ => continue,
                };
                let dir = match path_info.get(path_key) {
                    Some(d) if !d.is_empty() => d,
                    _ => continue,
                };
                if name.is_empty() {
                    continue;
                }
                let file_name = if suffix == DOT_XML { name.to_string() } else { lang.file_name(name) };
                let output = PathBuf::from(format!("{}{}{}{}", dir, SEPARATOR, file_name, suffix));
                if self.is_create(&output)? {
                    self.writer(&context, template_path, &output)?;
                    written.push(output);
                }
            }
            for file_out in self.injection.file_out_config_list() {
                let output = file_out.output(self.builder.global_config(), table_info)?;
                if self.is_create(&output)? {
                    self.writer(&context, &file_out.template_path, &output)?;
                    written.push(output);
                }
            }
        }
        Ok(written)
    }

    /// Whether `file_path` should be written; creates its parent directories
    fn is_create(&self, file_path: &Path) -> Result<bool> {
        let exist = file_path.exists();
        if !exist {
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
            }
        } else {
            eprintln!("File already exists: {}", file_path.display());
        }
        Ok(!exist || *self.builder.global_config().file_override())
    }

    fn writer(&self, context: &Context, template_path: &str, output_file: &Path) -> Result<()> {
        let template_name = Self::template_file_name(template_path);
        let result = self.tera.render(&template_name, context)?;
        fs::write(output_file, result.as_bytes()).map_err(|e| GeneratorError::io(output_file, e))?;
        eprintln!("Generated template: {}; file: {}", template_path, output_file.display());
        Ok(())
    }

    /// `/templates/entity.java` -> `entity.java.tmpl`
    pub fn template_file_name(file_path: &str) -> String {
        let mut file_path = file_path.to_string();
        if file_path.is_empty() {
            return file_path;
        }
        if !file_path.ends_with(TEMPLATE_SUFFIX) {
            file_path.push_str(TEMPLATE_SUFFIX);
        }
        match Path::new(&file_path).file_name() {
            Some(file_name) => file_name.to_string_lossy().to_string(),
            None => file_path,
        }
    }

    fn context(&self, table_info: &TableInfo) -> Context {
        let mut context = Context::new();
        let builder = &self.builder;
        let global_config = builder.global_config();
        context.insert("package", builder.package_info());
        context.insert("author", global_config.author());
        context.insert("date", &Local::now().format("%Y-%m-%d").to_string());
        context.insert("activeRecord", global_config.active_record());
        context.insert("enableCache", global_config.enable_cache());
        context.insert("baseResultMap", global_config.base_result_map());
        context.insert("baseColumnList", global_config.base_column_list());
        context.insert("table", table_info);
        context.insert("entity", table_info.entity_name());
        context.insert("restControllerStyle", builder.strategy_config().rest_controller_style());
        let supers = [
            ("superEntityClass", builder.super_entity_class()),
            ("superMapperClass", builder.super_mapper_class()),
            ("superServiceClass", builder.super_service_class()),
            ("superServiceImplClass", builder.super_service_impl_class()),
            ("superControllerClass", builder.super_controller_class()),
        ];
        for (key, class_path) in supers {
            context.insert(key, &simple_class_name(class_path));
            context.insert(format!("{}Package", key), &Some(class_path).filter(|c| !c.is_empty()));
        }
        context.insert("cfg", &self.cfg_map);
        context
    }
}
