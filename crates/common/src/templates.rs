// Solide - Solidity analysis toolkit
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Built-in contract templates used to start a new file.

/// A named starter contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractTemplate {
    /// Identifier used on the command line
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Solidity source
    pub code: &'static str,
}

/// All built-in templates, in display order
pub const TEMPLATES: &[ContractTemplate] = &[
    ContractTemplate {
        id: "blank",
        name: "Blank Contract",
        description: "Empty Solidity contract",
        code: BLANK,
    },
    ContractTemplate {
        id: "erc20",
        name: "ERC20 Token",
        description: "Minimal ERC20 token with transfers and allowances",
        code: ERC20,
    },
    ContractTemplate {
        id: "simple-storage",
        name: "Simple Storage",
        description: "Store and read a single value",
        code: SIMPLE_STORAGE,
    },
    ContractTemplate {
        id: "voting",
        name: "Voting Contract",
        description: "Proposals voted on once per address",
        code: VOTING,
    },
];

/// Look up a template by its identifier
pub fn find_template(id: &str) -> Option<&'static ContractTemplate> {
    TEMPLATES.iter().find(|template| template.id.eq_ignore_ascii_case(id))
}

const BLANK: &str = "// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract MyContract {
}
";

const ERC20: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract MyToken {
    string public name = "My Token";
    string public symbol = "MTK";
    uint8 public constant DECIMALS = 18;
    uint256 private _totalSupply;

    mapping(address => uint256) private _balances;
    mapping(address => mapping(address => uint256)) private _allowances;

    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);

    constructor(uint256 initialSupply) {
        _totalSupply = initialSupply;
        _balances[msg.sender] = initialSupply;
        emit Transfer(address(0), msg.sender, initialSupply);
    }

    function totalSupply() external view returns (uint256) {
        return _totalSupply;
    }

    function balanceOf(address account) external view returns (uint256) {
        return _balances[account];
    }

    function transfer(address to, uint256 amount) external returns (bool) {
        require(_balances[msg.sender] >= amount, "Insufficient balance");
        _balances[msg.sender] -= amount;
        _balances[to] += amount;
        emit Transfer(msg.sender, to, amount);
        return true;
    }

    function approve(address spender, uint256 amount) external returns (bool) {
        _allowances[msg.sender][spender] = amount;
        emit Approval(msg.sender, spender, amount);
        return true;
    }

    function transferFrom(address from, address to, uint256 amount) external returns (bool) {
        require(_allowances[from][msg.sender] >= amount, "Insufficient allowance");
        require(_balances[from] >= amount, "Insufficient balance");
        _allowances[from][msg.sender] -= amount;
        _balances[from] -= amount;
        _balances[to] += amount;
        emit Transfer(from, to, amount);
        return true;
    }
}
"#;

const SIMPLE_STORAGE: &str = "// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract SimpleStorage {
    uint256 private _storedData;

    event DataStored(uint256 data);

    function set(uint256 x) public {
        _storedData = x;
        emit DataStored(x);
    }

    function get() public view returns (uint256) {
        return _storedData;
    }
}
";

const VOTING: &str = "// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract Voting {
    struct Proposal {
        string name;
        uint256 voteCount;
    }

    Proposal[] public proposals;
    mapping(address => bool) public hasVoted;

    constructor(string[] memory proposalNames) {
        for (uint256 i = 0; i < proposalNames.length; i++) {
            proposals.push(Proposal({name: proposalNames[i], voteCount: 0}));
        }
    }

    function vote(uint256 proposal) external {
        require(!hasVoted[msg.sender], \"Already voted\");
        hasVoted[msg.sender] = true;
        proposals[proposal].voteCount += 1;
    }
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ids_are_unique() {
        let mut ids: Vec<_> = TEMPLATES.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("ERC20").map(|t| t.name), Some("ERC20 Token"));
        assert!(find_template("missing").is_none());
    }

    #[test]
    fn test_templates_carry_headers() {
        for template in TEMPLATES {
            assert!(template.code.starts_with("// SPDX-License-Identifier:"), "{}", template.id);
            assert!(template.code.contains("pragma solidity"), "{}", template.id);
        }
    }
}
